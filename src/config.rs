// Configuration loading and parsing (warmap.toml).
//
// The config names where the bundled datasets live (local paths or URLs)
// and the default filter bounds. A missing config file is not an error --
// the built-in defaults match the bundled dataset layout.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataSources,
    #[serde(default)]
    pub filters: FilterDefaults,
    /// Path to the dataset cache database. When omitted, a per-user data
    /// directory is used.
    #[serde(default)]
    pub cache_path: Option<String>,
}

/// Locations of the bundled datasets. Each entry is either a filesystem
/// path or an http(s) URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSources {
    pub players_json: String,
    pub international_json: String,
    pub populations_json: String,
    pub sample_players_csv: String,
    pub sample_population_csv: String,
}

impl Default for DataSources {
    fn default() -> Self {
        DataSources {
            players_json: "data/players.json".into(),
            international_json: "data/intplayers.json".into(),
            populations_json: "data/state-populations.json".into(),
            sample_players_csv: "sample-data/players_sample.csv".into(),
            sample_population_csv: "sample-data/state_pop_sample.csv".into(),
        }
    }
}

/// Default filter bounds applied before a dataset establishes its own
/// birth-year extent.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    pub min_year: i32,
    pub min_war: f64,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        FilterDefaults {
            min_year: 1850,
            min_war: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from `warmap.toml` in the current directory, falling
/// back to the built-in defaults when the file does not exist.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("warmap.toml"))
}

/// Load configuration from an explicit path. A missing file yields the
/// defaults; a present-but-invalid file is an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if !config.filters.min_war.is_finite() {
        return Err(ConfigError::Validation {
            field: "filters.min_war".into(),
            message: "must be a finite number".into(),
        });
    }
    for (field, value) in [
        ("data.players_json", &config.data.players_json),
        ("data.international_json", &config.data.international_json),
        ("data.populations_json", &config.data.populations_json),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: field.into(),
                message: "must not be empty".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
