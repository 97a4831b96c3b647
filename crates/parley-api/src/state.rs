//! Application state shared by the CLI commands and the bridge server.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::chat::registry::SessionRegistry;
use parley_core::llm::source::ProviderSource;
use parley_infra::config::{ConfigOverrides, apply_overrides, load_global_config};
use parley_infra::filesystem::resolve_data_dir;
use parley_infra::llm::source::ConfiguredProviderSource;
use parley_types::config::GlobalConfig;

/// Shared application state.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub source: Arc<dyn ProviderSource>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load `config.toml`, apply command-line overrides, and wire the registry.
    pub async fn init(overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = apply_overrides(load_global_config(&data_dir).await, overrides);

        tracing::debug!(
            data_dir = %data_dir.display(),
            endpoint = %config.endpoint,
            model = %config.model,
            max_tokens = config.max_tokens,
            busy_policy = %config.busy_policy,
            "Configuration loaded"
        );

        let source = ConfiguredProviderSource::new(config.clone())?;
        Ok(Self::from_source(Arc::new(source), config, data_dir))
    }

    /// Wire state around an existing provider source.
    pub fn from_source(
        source: Arc<dyn ProviderSource>,
        config: GlobalConfig,
        data_dir: PathBuf,
    ) -> Self {
        let registry = SessionRegistry::new(source.clone(), config.busy_policy);
        Self {
            registry: Arc::new(registry),
            source,
            config: Arc::new(config),
            data_dir,
        }
    }

    /// Whether a credential can currently be resolved.
    pub fn credential_configured(&self) -> bool {
        self.source.resolve().is_ok()
    }
}
