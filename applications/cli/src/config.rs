/// CLI configuration
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "chartdex.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Library roots scanned when `scan` gets no paths
    #[serde(default)]
    pub library_paths: Vec<PathBuf>,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_paths: Vec::new(),
            database_url: default_database_url(),
            max_depth: default_max_depth(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `chartdex.toml` is read if it
    /// is in the working directory. `CHARTDEX_*` variables override both.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with CHARTDEX_)
        settings = settings.add_source(
            config::Environment::with_prefix("CHARTDEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("library_paths"),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database_url is required (set CHARTDEX_DATABASE_URL)".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_database_url() -> String {
    "sqlite://chartdex.db".to_string()
}

fn default_max_depth() -> usize {
    20
}
