//! LLM request/response types for Parley.
//!
//! These types model the data shapes for a single chat-completion exchange:
//! the request envelope sent upstream, the normalised response, and the
//! classified failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Reserved; never produced by the panel flow.
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single `{role, content}` pair in a request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Request envelope: the projected conversation plus model settings.
///
/// Built fresh for every call from the whole message log. Image payloads are
/// never part of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
}

/// Normalised successful completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Text of the first choice.
    pub content: String,
    /// Model reported by the provider, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

/// Token usage for a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from a single inference exchange.
///
/// The `Display` text of each variant is what the user sees in the panel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Non-2xx response or transport failure. `status_code` is `None` when
    /// no HTTP response was received at all.
    #[error("API error: {message}")]
    Api {
        status_code: Option<u16>,
        message: String,
    },

    /// Well-formed response carrying zero choices.
    #[error("No response from API")]
    EmptyResponse,

    /// A 2xx response whose body could not be decoded.
    #[error("Error: failed to parse API response: {0}")]
    Deserialization(String),
}

impl LlmError {
    /// HTTP status attached to the failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::Api { status_code, .. } => *status_code,
            _ => None,
        }
    }
}
