//! Scripted provider source shared by the chat tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use parley_types::error::ChatError;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::provider::LlmProvider;
use crate::llm::source::{ProviderSource, ResolvedProvider};

type Reply = Result<CompletionResponse, LlmError>;

pub(crate) fn ok_reply(content: &str) -> Reply {
    Ok(CompletionResponse {
        content: content.to_string(),
        model: Some("mock-model".to_string()),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    })
}

#[derive(Clone)]
pub(crate) struct MockSource {
    configured: bool,
    delay: Option<Duration>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockSource {
    pub(crate) fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            configured: true,
            delay: None,
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::with_replies(Vec::new())
        }
    }

    /// Every completion sleeps for `delay` before answering.
    pub(crate) fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProviderSource for MockSource {
    fn resolve(&self) -> Result<ResolvedProvider, ChatError> {
        if !self.configured {
            return Err(ChatError::missing_api_key());
        }
        Ok(ResolvedProvider {
            provider: BoxLlmProvider::new(MockProvider {
                source: self.clone(),
            }),
            model: "mock-model".to_string(),
            max_tokens: 64,
        })
    }
}

struct MockProvider {
    source: MockSource,
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.source.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.source.delay {
            tokio::time::sleep(delay).await;
        }
        self.source
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }
}
