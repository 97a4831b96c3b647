//! LlmProvider trait definition.
//!
//! This is the core abstraction that the inference client implements.
//! Uses RPITIT for `complete`; see `BoxLlmProvider` for dynamic dispatch.

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends.
///
/// One call to `complete` is exactly one network exchange: no retries, no
/// backoff. Implementations are stateless with respect to the conversation
/// and never see the message log, only the envelope built from it.
///
/// Implementations live in parley-infra (e.g., `OpenAiChatProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
