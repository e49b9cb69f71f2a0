//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Address the HTTP server binds to
    pub listen_addr: String,

    /// Party name shown to joining guests
    pub party_name: String,

    /// Seconds between keep-alive writes on subscriber channels
    pub keep_alive_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            listen_addr: "0.0.0.0:4173".to_string(),
            party_name: "Headphone Party".to_string(),
            keep_alive_secs: 15,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the default location, or create it
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    /// Load configuration from `path`, creating it with defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .context("Failed to read config file")?;

            let mut config: ServerConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            config.config_path = path.to_path_buf();
            Ok(config)
        } else {
            let config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save()
                .context("Failed to save default config")?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("partyline")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = ServerConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.listen_addr, "0.0.0.0:4173");
        assert_eq!(config.keep_alive_secs, 15);
    }

    #[test]
    fn test_saved_config_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ServerConfig::load_from(&path).unwrap();
        config.listen_addr = "127.0.0.1:9000".to_string();
        config.party_name = "Rooftop".to_string();
        config.save().unwrap();

        let reloaded = ServerConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.listen_addr, "127.0.0.1:9000");
        assert_eq!(reloaded.party_name, "Rooftop");
    }
}
