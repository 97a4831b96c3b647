//! Conversation turn and session summary types for Parley.
//!
//! A session's message log is an ordered list of [`Turn`]s. User turns carry
//! a timestamp and may carry an image; assistant turns carry only text and
//! are ordered by their position in the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::Message;

// Turns and envelope messages share one role type.
pub use crate::llm::MessageRole;

/// Image attached to a user question.
///
/// `data` is a self-describing data URI (`data:image/png;base64,...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub data: String,
    /// MIME type as reported by the panel (e.g. `image/png`).
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Original filename, when the panel knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ImageAttachment {
    /// An attachment with no payload counts as no attachment.
    pub fn is_present(&self) -> bool {
        !self.data.trim().is_empty()
    }
}

/// One conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Creation time (user turns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Attached image (user turns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
}

impl Turn {
    /// Build a user turn stamped with the current time.
    ///
    /// Blank text is stored as `None` so that image-only questions do not
    /// carry an empty content string.
    pub fn user(text: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        let text = text.into();
        Self {
            role: MessageRole::User,
            content: if text.is_empty() { None } else { Some(text) },
            timestamp: Some(Utc::now()),
            image,
        }
    }

    /// Build an assistant turn. Assistant turns have no timestamp.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            timestamp: None,
            image: None,
        }
    }

    /// Text content, or the empty string when there is none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Project this turn into an envelope message. Image data is dropped.
    pub fn to_message(&self) -> Message {
        Message {
            role: self.role,
            content: self.text().to_string(),
        }
    }
}

/// Read-only summary of a live session, used by listings and the REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub turn_count: usize,
    pub total_input_tokens: u32,
    pub total_output_tokens: u32,
    /// True while a question is being answered.
    pub busy: bool,
}
