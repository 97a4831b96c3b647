//! Wire types for the OpenAI-compatible chat-completions API.
//!
//! Response types are lenient: every field the client does not
//! strictly need is optional, so providers that omit `usage`, `model`, or
//! `error.type` still decode.

use serde::{Deserialize, Serialize};

/// Request body: `{model, messages:[{role, content}], max_tokens}`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: String,
    pub content: &'a str,
}

/// Success body. Only `choices` is required.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    /// `null` for refusals and tool-call-only replies.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Error body: `{error: {message, type, code?}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Some providers send a string code, others a number.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The provider-supplied message, if the body carries a non-blank one.
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|detail| detail.message.as_deref())
            .filter(|message| !message.trim().is_empty())
    }
}

/// Parse a raw error body and pull out `error.message`.
pub fn extract_error_message(raw: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(raw)
        .ok()
        .and_then(|body| body.message().map(str::to_string))
}
