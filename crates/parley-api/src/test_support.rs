//! Provider sources for exercising the HTTP layer without a network.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::provider::LlmProvider;
use parley_core::llm::source::{ProviderSource, ResolvedProvider};
use parley_types::config::GlobalConfig;
use parley_types::error::ChatError;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use crate::state::AppState;

/// Replies with `echo: <last message>`, optionally after a delay.
struct EchoProvider {
    delay: Duration,
}

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let last = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(CompletionResponse {
            content: format!("echo: {last}"),
            model: Some(request.model.clone()),
            usage: Usage {
                input_tokens: 3,
                output_tokens: 2,
            },
        })
    }
}

struct EchoSource {
    delay: Duration,
}

impl ProviderSource for EchoSource {
    fn resolve(&self) -> Result<ResolvedProvider, ChatError> {
        Ok(ResolvedProvider {
            provider: BoxLlmProvider::new(EchoProvider { delay: self.delay }),
            model: "echo-model".to_string(),
            max_tokens: 32,
        })
    }
}

struct UnconfiguredSource;

impl ProviderSource for UnconfiguredSource {
    fn resolve(&self) -> Result<ResolvedProvider, ChatError> {
        Err(ChatError::missing_api_key())
    }
}

pub(crate) fn echo_state() -> AppState {
    slow_echo_state(Duration::ZERO)
}

/// Echo state whose provider takes `delay` to answer each question.
pub(crate) fn slow_echo_state(delay: Duration) -> AppState {
    AppState::from_source(
        Arc::new(EchoSource { delay }),
        GlobalConfig::default(),
        PathBuf::from("/tmp/parley-test"),
    )
}

pub(crate) fn unconfigured_state() -> AppState {
    AppState::from_source(
        Arc::new(UnconfiguredSource),
        GlobalConfig::default(),
        PathBuf::from("/tmp/parley-test"),
    )
}
