use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{read_to_string, try_exists};
use tracing::{debug, info, warn, Level};

use crate::dispatch::dispatcher::DispatcherSettings;

const CONFIG_DIR: &str = "retropad";
const SETTINGS_FILE: &str = "router.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Runtime settings of the input router and the binary around it
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RouterSettings {
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// Broadcast capacity of each touch surface
    pub surface_buffer: usize,
    /// Broadcast capacity of the physical input
    pub physical_buffer: usize,
    pub dispatcher: DispatcherSettings,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            surface_buffer: 64,
            physical_buffer: 256,
            dispatcher: DispatcherSettings::default(),
        }
    }
}

impl RouterSettings {
    /// `<config dir>/retropad/router.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push(CONFIG_DIR);
        path.push(SETTINGS_FILE);
        Ok(path)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads settings, falling back to defaults when the file does not exist
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let exists = try_exists(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !exists {
            info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let settings = Self::from_toml(&content)?;
        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn log_level(&self) -> Level {
        match self.log_level.parse() {
            Ok(level) => level,
            Err(_) => {
                warn!("Unknown log level '{}', using info", self.log_level);
                Level::INFO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let settings = RouterSettings::from_toml(
            r#"
            log_level = "debug"

            [dispatcher]
            fast_forward_multiplier = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.log_level(), Level::DEBUG);
        assert_eq!(settings.surface_buffer, 64);
        assert_eq!(settings.dispatcher.fast_forward_multiplier, 3);
        assert_eq!(settings.dispatcher.slow_motion_factor, 0.8);
        assert!(settings.dispatcher.reset_on_release);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = RouterSettings::from_toml("surface_buffer = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let settings = RouterSettings {
            log_level: "chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.log_level(), Level::INFO);
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = RouterSettings::load(&dir.path().join("router.toml"))
            .await
            .unwrap();
        assert_eq!(settings, RouterSettings::default());
    }

    #[tokio::test]
    async fn settings_file_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("router.toml");
        std::fs::write(&path, "physical_buffer = 32\n[dispatcher]\nreset_on_release = false\n")
            .unwrap();

        let settings = RouterSettings::load(&path).await.unwrap();
        assert_eq!(settings.physical_buffer, 32);
        assert!(!settings.dispatcher.reset_on_release);
        assert_eq!(settings.log_level, "info");
    }
}
