use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Initial background shown before any search is made
pub const DEFAULT_INITIAL_BACKGROUND: &str =
    "https://i.pinimg.com/originals/e1/70/03/e17003d3a86823bea8a48e4ec03d33e9.gif";

/// Backgrounds cycled after each successful forecast
pub const DEFAULT_BACKGROUND_CATALOG: [&str; 8] = [
    "https://i.pinimg.com/736x/55/41/08/55410835d2ea4e373b30ae7932bb95f0.jpg",
    "https://i.pinimg.com/736x/eb/16/66/eb1666747aef57e5d60e07e095e0683f.jpg",
    "https://i.pinimg.com/736x/29/38/4e/29384e0b1c1adbbd307c712496cf961d.jpg",
    "https://i.pinimg.com/736x/38/38/03/383803550dc373e6389ab06dc695ae97.jpg",
    "https://i.pinimg.com/736x/72/a1/e2/72a1e296a9ee6b93b8b9e6ff15e4c4f4.jpg",
    "https://i.pinimg.com/736x/c4/01/39/c401399ef4b686b2d6edfba1c3eb7bd8.jpg",
    "https://i.pinimg.com/736x/53/ac/7a/53ac7a6e725ccda99905052a2c16500d.jpg",
    "https://i.pinimg.com/736x/e1/09/6f/e1096f535670930e4a55b9d6fe157770.jpg",
];

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml and the rotation state file.
    /// Taken from the location the file was loaded from.
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Trends backend
    #[serde(default)]
    pub server: ServerConfig,

    /// Background image catalog
    #[serde(default)]
    pub backgrounds: BackgroundConfig,

    /// Request pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Where rendered charts are written
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL serving `/weather` and `/forecast`
    pub base_url: String,

    /// Per-request timeout. Unset means requests never time out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundConfig {
    /// Shown on startup; never part of the rotation
    pub initial: String,

    /// Rotation set
    pub catalog: Vec<String>,

    /// Download catalog images into memory on startup
    #[serde(default = "default_true")]
    pub preload: bool,

    /// Keep the last shown index in `rotation.json` between launches
    #[serde(default = "default_true")]
    pub persist_rotation: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_BACKGROUND.to_string(),
            catalog: DEFAULT_BACKGROUND_CATALOG
                .iter()
                .map(|s| s.to_string())
                .collect(),
            preload: true,
            persist_rotation: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stop the run when the weather stage reports an error instead of
    /// continuing to the forecast stage
    #[serde(default)]
    pub abort_on_weather_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for decoded chart PNGs
    pub chart_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chart_dir: PathBuf::from("charts"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trendcast");

        Self {
            config_dir,
            server: ServerConfig::default(),
            backgrounds: BackgroundConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_dir = path.parent().map(Path::to_path_buf);

        if !path.exists() {
            let mut config = Self::default();
            if let Some(dir) = config_dir {
                config.config_dir = dir;
            }
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        config.config_dir = config_dir.unwrap_or_else(|| Self::default().config_dir);

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.server.base_url, "server.base_url", &mut result);

        if self.server.request_timeout_secs == Some(0) {
            result.add_error(
                "server.request_timeout_secs",
                "Timeout must be greater than 0 (omit it to disable)",
            );
        }

        validate_url(&self.backgrounds.initial, "backgrounds.initial", &mut result);

        match self.backgrounds.catalog.len() {
            0 => result.add_error("backgrounds.catalog", "At least one image is required"),
            1 => result.add_warning(
                "backgrounds.catalog",
                "Only one image; the background will not change between searches",
            ),
            _ => {}
        }

        for (i, image) in self.backgrounds.catalog.iter().enumerate() {
            validate_url(image, &format!("backgrounds.catalog[{}]", i), &mut result);
        }

        if self.pipeline.abort_on_weather_error {
            result.add_warning(
                "pipeline.abort_on_weather_error",
                "Forecast is skipped whenever the weather lookup fails",
            );
        }

        result
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Path of the persisted rotation index
    pub fn rotation_state_path(&self) -> PathBuf {
        self.config_dir.join("rotation.json")
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("trendcast");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
