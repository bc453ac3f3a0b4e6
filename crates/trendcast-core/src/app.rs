use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::Config;

/// Application state and lifecycle
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Load and validate configuration, from `config_path` or the default location
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config, validation) = Config::load_validated(config_path)?;
        tracing::info!(
            server = %config.server.base_url,
            images = config.backgrounds.catalog.len(),
            warnings = validation.warnings.len(),
            "Configuration loaded"
        );
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Apply in-process overrides (command-line flags) on top of the loaded file
    pub fn configure(&mut self, apply: impl FnOnce(&mut Config)) {
        apply(Arc::make_mut(&mut self.config));
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down");
        Ok(())
    }
}
