use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file picked up from the working directory when no `--config` is given.
pub const DEFAULT_SETTINGS_FILE: &str = "modelcheck.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("toml decode error in {}: {source}", .path.display())]
    TomlDecode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "warn".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Models files checked when none are given on the command line.
    pub models: Vec<PathBuf>,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models: vec![PathBuf::from("docs/models.yml")],
            logging: LoggingSettings::default(),
        }
    }
}

/// Load settings from `explicit`, or from [`DEFAULT_SETTINGS_FILE`] when it exists.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    match explicit {
        Some(path) => read_settings(path),
        None => {
            let path = Path::new(DEFAULT_SETTINGS_FILE);
            if path.exists() {
                read_settings(path)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::TomlDecode {
        path: path.to_path_buf(),
        source,
    })
}
