use thiserror::Error;

use crate::llm::LlmError;

/// Message shown when no credential can be resolved.
pub const MISSING_API_KEY_MESSAGE: &str =
    "API key is not configured. Set `api_key` in config.toml or the PARLEY_API_KEY environment variable.";

/// Errors surfaced by a chat session.
///
/// Every variant is recovered at the session boundary and rendered into an
/// `error` UI event using its `Display` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The inference client cannot be configured (credential missing).
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The question failed the presence check.
    #[error("Invalid question: {0}")]
    InvalidInput(String),

    /// Another question is still in flight and the session rejects overlap.
    #[error("A previous question is still being answered. Please wait for it to finish.")]
    Busy,

    /// Anything else caught at the session boundary.
    #[error("Error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Configuration error for a missing credential.
    pub fn missing_api_key() -> Self {
        ChatError::Configuration(MISSING_API_KEY_MESSAGE.to_string())
    }
}

/// Errors from session registry lookups.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_display() {
        let err = ChatError::missing_api_key();
        assert!(err.to_string().contains("API key is not configured"));
    }

    #[test]
    fn test_llm_error_is_transparent() {
        let err: ChatError = LlmError::Api {
            status_code: Some(401),
            message: "invalid key".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "API error: invalid key");
    }

    #[test]
    fn test_internal_display() {
        let err = ChatError::Internal("task panicked".to_string());
        assert_eq!(err.to_string(), "Error: task panicked");
    }

    #[test]
    fn test_session_error_display() {
        assert_eq!(SessionError::NotFound.to_string(), "session not found");
    }
}
