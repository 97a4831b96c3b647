//! Per-question provider resolution.
//!
//! The orchestrator does not hold a provider for its whole lifetime. Settings
//! (credential, model, output bound) are read again for every question, so a
//! key configured after the panel opened takes effect on the next ask.

use parley_types::error::ChatError;

use super::box_provider::BoxLlmProvider;

/// A provider bound to the settings in force for one question.
#[derive(Debug)]
pub struct ResolvedProvider {
    pub provider: BoxLlmProvider,
    pub model: String,
    pub max_tokens: u32,
}

/// Resolves the provider to use for the next question.
///
/// Returns [`ChatError::Configuration`] when no credential is available;
/// the orchestrator then drops the question without touching the log.
pub trait ProviderSource: Send + Sync {
    fn resolve(&self) -> Result<ResolvedProvider, ChatError>;
}
