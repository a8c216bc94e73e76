//! Configuration management for the diabetes risk scorer

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file, optional
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing `<name>.<ext>` model files
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Artifact extensions probed in order
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_extensions() -> Vec<String> {
    let mut extensions = vec!["json".to_string()];
    if cfg!(feature = "onnx") {
        extensions.push("onnx".to_string());
    }
    extensions
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            extensions: default_extensions(),
        }
    }
}

/// Dashboard output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Pre-rendered SHAP summary image
    #[serde(default = "default_shap_summary")]
    pub shap_summary: PathBuf,
    /// Rows shown in the upload preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Field delimiter of uploaded tables
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_shap_summary() -> PathBuf {
    PathBuf::from("reports/shap_summary.png")
}

fn default_preview_rows() -> usize {
    5
}

fn default_delimiter() -> char {
    ','
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            shap_summary: default_shap_summary(),
            preview_rows: default_preview_rows(),
            delimiter: default_delimiter(),
        }
    }
}

impl DashboardConfig {
    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("Delimiter {:?} is not a single ASCII character", self.delimiter))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file (if present) and environment
    pub fn load() -> Result<Self> {
        Self::build(File::with_name(DEFAULT_CONFIG_PATH).required(false))
    }

    /// Load configuration from a specific file, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(File::from(path.as_ref()).required(true))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("DIABETES_RISK")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("models.extensions")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
