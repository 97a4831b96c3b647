//! Global configuration loader for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use parley_types::config::GlobalConfig;

/// Smallest accepted output bound.
const MIN_MAX_TOKENS: u32 = 1;

/// Command-line overrides layered on top of the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Apply command-line overrides. A zero `max_tokens` is raised to the floor.
pub fn apply_overrides(mut config: GlobalConfig, overrides: ConfigOverrides) -> GlobalConfig {
    if let Some(endpoint) = overrides.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(model) = overrides.model {
        config.model = model;
    }
    if let Some(max_tokens) = overrides.max_tokens {
        config.max_tokens = max_tokens;
    }
    config.max_tokens = config.max_tokens.max(MIN_MAX_TOKENS);
    config
}
