//! TOML configuration for the `rank_map` tool.
//!
//! Resolution order: `--config <path>`, then the `RANK_MAP_CONFIG`
//! environment variable, then `rank_map.toml` in the working directory.
//! A missing default file is not an error; every section falls back to
//! its defaults.

use std::path::{Path, PathBuf};

use rank_map_analysis_models::AnalysisConfig;
use rank_map_ingest::IngestConfig;
use rank_map_render::RenderConfig;
use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rank_map.toml";

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "RANK_MAP_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`RankMapConfig`].
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}

/// Full tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankMapConfig {
    /// `[ingest]` section.
    pub ingest: IngestConfig,
    /// `[analysis]` section.
    pub analysis: AnalysisConfig,
    /// `[render]` section.
    pub render: RenderConfig,
}

impl RankMapConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text does not match the schema.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        config.sync();
        Ok(config)
    }

    /// Loads the config from an explicit path, the environment, or the
    /// default file, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly requested file cannot be
    /// read, or if any located file fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let path = match requested {
            Some(path) => path,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        log::info!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Copies settings shared between sections.
    pub fn sync(&mut self) {
        self.render
            .special_label
            .clone_from(&self.analysis.special_label);
    }
}
