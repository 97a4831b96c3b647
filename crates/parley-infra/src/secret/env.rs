//! Environment variable secret provider.
//!
//! A read-only lookup consulted when `config.toml` carries no credential.
//! Values are re-read on every call, so exporting a key takes effect
//! without restarting the server.

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "PARLEY_API_KEY";

/// Environment variable secret provider.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    /// Read `key` from the environment.
    ///
    /// Unset, blank, and non-Unicode values all read as `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(val) if !val.trim().is_empty() => Some(val),
            Ok(_) => None,
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                tracing::warn!(key, "Ignoring non-Unicode secret in environment");
                None
            }
        }
    }
}
