use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Tool-level configuration: where the bookkeeping data lives. Per-company
/// settings are stored inside the data store itself, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
        }
    }
}

fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AUDITTHIS_CONFIG_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("auditthis")
}

fn config_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("auditthis")
}

pub fn load_config() -> Config {
    let path = config_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Config::default()
    }
}

pub fn save_config(config: &Config) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| AuditError::Config(e.to_string()))?;
    std::fs::write(config_path(), format!("{json}\n"))?;
    Ok(())
}

/// Resolve the active data directory. The env var wins so tests and
/// scripted runs can point at an isolated directory without touching the
/// user's config file.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AUDITTHIS_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(&load_config().data_dir)
}

pub fn store_path() -> PathBuf {
    get_data_dir().join("auditthis.db")
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let config = Config {
            data_dir: "/tmp/books".to_string(),
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Config = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/books");
    }

    #[test]
    fn test_default_data_dir_is_set() {
        let config = Config::default();
        assert!(!config.data_dir.is_empty());
    }
}
