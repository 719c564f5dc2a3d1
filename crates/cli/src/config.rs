//! CLI configuration, read from `~/.codex/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use codex_progress::{EngineConfig, ShareConfig, DEFAULT_ACTIVITY_LOG_CAP};

/// File name of the key store inside the data directory.
const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodexConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store; `~/.codex` when unset
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog JSON file; the bundled catalog when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub log_cap: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            log_cap: DEFAULT_ACTIVITY_LOG_CAP,
        }
    }
}

impl CodexConfig {
    /// Load from `path`, or from the default location. A missing file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Directory where the store lives.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::home_dir(),
        }
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(STORE_FILE))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            activity_log_cap: self.activity.log_cap,
            share: self.share.clone(),
        }
    }

    fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".codex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CodexConfig::default();
        assert!(config.storage.data_dir.is_none());
        assert!(config.catalog.path.is_none());
        assert_eq!(config.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = CodexConfig::parse(
            r#"
            [share]
            origin = "https://learn.example.org"

            [activity]
            log_cap = 100
            "#,
        )
        .unwrap();

        let engine = config.engine_config();
        assert_eq!(engine.activity_log_cap, 100);
        assert_eq!(engine.share.origin, "https://learn.example.org");
        assert_eq!(engine.share.route, "/progress");
    }

    #[test]
    fn test_store_path_uses_data_dir() {
        let mut config = CodexConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/var/lib/codex"));
        assert_eq!(
            config.store_path().unwrap(),
            PathBuf::from("/var/lib/codex/store.json")
        );
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodexConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, CodexConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[catalog]\npath = \"/tmp/catalog.json\"\n").unwrap();

        let config = CodexConfig::load(Some(&path)).unwrap();
        assert_eq!(config.catalog.path, Some(PathBuf::from("/tmp/catalog.json")));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(CodexConfig::parse("[activity]\nlog_cap = \"many\"").is_err());
    }
}
