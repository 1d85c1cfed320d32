//! Server configuration.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Root of the `<owner>/<repo>/<job_id>.log` tree.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_logs_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("joblog")
        .join("logs")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs_dir: default_logs_dir(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default location (config/default.toml) or fall back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/default.toml");
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("joblog.toml");
        std::fs::write(&path, "port = 9090\nlogs_dir = \"/srv/logs\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.logs_dir, PathBuf::from("/srv/logs"));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("joblog.toml");
        std::fs::write(&path, "port = \"not a number\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_default_logs_dir() {
        let config = Config::default();
        assert!(config.logs_dir.ends_with("joblog/logs"));
    }
}
