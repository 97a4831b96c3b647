//! Events exchanged with the panel over the UI bridge.
//!
//! Inbound frames are [`UiCommand`]s (`{"command": "askQuestion", ...}`);
//! outbound frames are [`UiEvent`]s (`{"type": "response", "content": ...}`).

use serde::{Deserialize, Serialize};

use crate::chat::ImageAttachment;

/// Command sent by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum UiCommand {
    /// Ask a question, optionally with an attached image.
    AskQuestion {
        #[serde(default)]
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageAttachment>,
    },
    /// Keep-alive. Answered with [`UiEvent::Pong`] by the bridge.
    Ping,
}

/// Event delivered to the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum UiEvent {
    /// Assistant reply text.
    Response(String),
    /// Human-readable failure message.
    Error(String),
    Pong,
}

impl UiEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, UiEvent::Error(_))
    }

    /// Text payload, if the event carries one.
    pub fn content(&self) -> Option<&str> {
        match self {
            UiEvent::Response(content) | UiEvent::Error(content) => Some(content),
            UiEvent::Pong => None,
        }
    }
}
