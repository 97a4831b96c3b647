//! OpenAI-compatible chat-completions client.
//!
//! [`OpenAiChatProvider`] turns one request envelope into exactly one HTTP
//! POST and normalises the outcome:
//!
//! - 2xx with at least one choice: the first choice's text
//! - 2xx with zero choices: [`LlmError::EmptyResponse`]
//! - non-2xx or transport failure: [`LlmError::Api`], with the provider's
//!   `error.message` preferred over the transport error text
//!
//! There are no retries and no backoff; the user is the retry mechanism.

pub mod types;

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::LlmProvider;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use self::types::{ChatCompletionBody, ChatCompletionResponse, ChatMessage, extract_error_message};

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// building the `Authorization` header. The type does not implement `Debug`.
pub struct OpenAiChatProvider {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
}

impl OpenAiChatProvider {
    /// Create a provider posting to `endpoint` (the full chat-completions URL).
    ///
    /// `client` is shared; cloning a `reqwest::Client` only bumps a refcount.
    pub fn new(client: reqwest::Client, api_key: SecretString, endpoint: String) -> Self {
        Self {
            client,
            api_key,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Convert a generic [`CompletionRequest`] into the wire body.
    fn to_body<'a>(request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
        }
    }
}

impl LlmProvider for OpenAiChatProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_body(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Chat completion request failed before a response");
                LlmError::Api {
                    status_code: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if let Err(transport_err) = response.error_for_status_ref() {
            let error_body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&error_body).unwrap_or_else(|| {
                tracing::debug!(
                    status = status.as_u16(),
                    "Error body carried no message, using transport error text"
                );
                transport_err.to_string()
            });
            return Err(LlmError::Api {
                status_code: Some(status.as_u16()),
                message,
            });
        }

        let raw = response.text().await.map_err(|e| LlmError::Api {
            status_code: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        let parsed: ChatCompletionResponse = serde_json::from_str(&raw)
            .map_err(|e| LlmError::Deserialization(e.to_string()))?;

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        let Some(choice) = parsed.choices.into_iter().next() else {
            tracing::debug!(response_id = ?parsed.id, "Chat completion returned zero choices");
            return Err(LlmError::EmptyResponse);
        };

        tracing::debug!(
            response_id = ?parsed.id,
            finish_reason = ?choice.finish_reason,
            "Chat completion received"
        );

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: parsed.model,
            usage,
        })
    }
}
