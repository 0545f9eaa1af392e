//! Settings file handling
//!
//! Settings live in `~/.config/voice-monitor/config.toml`. A missing file
//! means defaults; command line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::MonitorError;
use crate::mqtt::config::MqttConfig;

const CONFIG_DIR: &str = ".config/voice-monitor";
const CONFIG_FILE: &str = "config.toml";

/// Broker connection settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "voice-monitor".to_string(),
            keep_alive_secs: 60,
            username: None,
            password: None,
        }
    }
}

/// What to watch and how much to show
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MonitorOptions {
    /// First topic level shared by all assistant messages
    pub namespace: String,
    /// Owner to filter on; unset watches every owner
    pub user: Option<String>,
    pub verbose: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            namespace: "audio".to_string(),
            user: None,
            verbose: false,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub monitor: MonitorOptions,
}

impl Settings {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Reads settings from `path`, falling back to defaults when absent
    pub async fn load(path: &Path) -> Result<Self, MonitorError> {
        let exists = tokio::fs::try_exists(path).await.map_err(|e| {
            MonitorError::Config(format!("Failed to check {}: {}", path.display(), e))
        })?;
        if !exists {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            MonitorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_toml(&content)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, MonitorError> {
        toml::from_str(content)
            .map_err(|e| MonitorError::Config(format!("Failed to parse settings: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String, MonitorError> {
        toml::to_string_pretty(self)
            .map_err(|e| MonitorError::Config(format!("Failed to serialize settings: {}", e)))
    }

    /// Writes the default settings unless a file already exists (or `force`)
    ///
    /// Returns whether a file was written.
    pub async fn write_default(path: &Path, force: bool) -> Result<bool, MonitorError> {
        if !force && tokio::fs::try_exists(path).await.unwrap_or(false) {
            warn!("Settings already exist at {}", path.display());
            return Ok(false);
        }

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                MonitorError::Config(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let content = Self::default().to_toml()?;
        tokio::fs::write(path, content).await.map_err(|e| {
            MonitorError::Config(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!("Wrote default settings to {}", path.display());
        Ok(true)
    }

    pub fn mqtt_config(&self) -> MqttConfig {
        MqttConfig::from(&self.broker)
    }

    /// Applies command line values on top of the file
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.broker.host = host;
        }
        if let Some(port) = overrides.port {
            self.broker.port = port;
        }
        if let Some(namespace) = overrides.namespace {
            self.monitor.namespace = namespace;
        }
        if overrides.all_users {
            self.monitor.user = None;
        } else if let Some(user) = overrides.user {
            self.monitor.user = Some(user);
        }
        if overrides.verbose {
            self.monitor.verbose = true;
        }
    }
}

/// Values given on the command line; `None` keeps the file value
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub namespace: Option<String>,
    pub user: Option<String>,
    /// Drops a user filter configured in the file
    pub all_users: bool,
    pub verbose: bool,
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [broker]
            host = "192.168.3.3"

            [monitor]
            user = "single-user"
            "#,
        )
        .unwrap();

        assert_eq!(settings.broker.host, "192.168.3.3");
        assert_eq!(settings.broker.port, 1883);
        assert_eq!(settings.monitor.namespace, "audio");
        assert_eq!(settings.monitor.user.as_deref(), Some("single-user"));
        assert!(!settings.monitor.verbose);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Settings::from_toml("[broker\nhost=").unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.monitor.user = Some("from-file".to_string());

        settings.apply(Overrides {
            host: Some("broker.lan".to_string()),
            verbose: true,
            ..Overrides::default()
        });
        assert_eq!(settings.broker.host, "broker.lan");
        assert_eq!(settings.broker.port, 1883);
        assert_eq!(settings.monitor.user.as_deref(), Some("from-file"));
        assert!(settings.monitor.verbose);

        settings.apply(Overrides {
            user: Some("ignored".to_string()),
            all_users: true,
            ..Overrides::default()
        });
        assert_eq!(settings.monitor.user, None);
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_write_default_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert!(Settings::write_default(&path, false).await.unwrap());
        assert!(!Settings::write_default(&path, false).await.unwrap());
        assert!(Settings::write_default(&path, true).await.unwrap());

        let settings = Settings::load(&path).await.unwrap();
        assert_eq!(settings, Settings::default());
    }
}
