//! Binds the OpenAI-compatible client to the loaded configuration.

use std::time::Duration;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::source::{ProviderSource, ResolvedProvider};
use parley_types::config::GlobalConfig;
use parley_types::error::ChatError;

use super::openai_compat::OpenAiChatProvider;
use crate::secret::env::{API_KEY_ENV, EnvSecretProvider};

/// [`ProviderSource`] backed by [`GlobalConfig`] and the environment.
///
/// The HTTP client is built once and shared by every resolved provider.
/// The credential is looked up on each call: `api_key` from the config
/// first, then the `PARLEY_API_KEY` environment variable.
pub struct ConfiguredProviderSource {
    config: GlobalConfig,
    client: reqwest::Client,
    env: EnvSecretProvider,
    key_var: String,
}

impl ConfiguredProviderSource {
    pub fn new(config: GlobalConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            config,
            client: builder.build()?,
            env: EnvSecretProvider::new(),
            key_var: API_KEY_ENV.to_string(),
        })
    }

    /// Read the credential from `var` instead of `PARLEY_API_KEY`.
    pub fn with_key_var(mut self, var: impl Into<String>) -> Self {
        self.key_var = var.into();
        self
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    fn api_key(&self) -> Option<SecretString> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| SecretString::from(key.to_string()))
            .or_else(|| self.env.get(&self.key_var).map(SecretString::from))
    }
}

impl ProviderSource for ConfiguredProviderSource {
    fn resolve(&self) -> Result<ResolvedProvider, ChatError> {
        let Some(api_key) = self.api_key() else {
            return Err(ChatError::missing_api_key());
        };

        let provider = OpenAiChatProvider::new(
            self.client.clone(),
            api_key,
            self.config.endpoint.clone(),
        );

        Ok(ResolvedProvider {
            provider: BoxLlmProvider::new(provider),
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
        })
    }
}
