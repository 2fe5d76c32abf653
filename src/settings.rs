use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DossierError, Result};
use crate::label::DEFAULT_DEALER_NAME;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DB_FILE: &str = "dossier.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_dealer_name")]
    pub dealer_name: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_dealer_name() -> String {
    DEFAULT_DEALER_NAME.to_string()
}

fn default_model_name() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            dealer_name: default_dealer_name(),
            model_name: default_model_name(),
            api_base: default_api_base(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("dossier")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("dossier")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DossierError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    tracing::debug!(path = %settings_path().display(), "settings saved");
    Ok(())
}

pub fn get_db_path() -> PathBuf {
    load_settings().db_path()
}

/// API key for the extraction service. Only read from the environment.
pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
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
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            dealer_name: "Garage Veen".to_string(),
            model_name: "gemini-1.5-flash".to_string(),
            api_base: default_api_base(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.dealer_name, "Garage Veen");
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.model_name, "gemini-1.5-flash");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.dealer_name, "Land Automotive");
        assert_eq!(s.model_name, "gemini-1.5-pro");
        assert!(!s.data_dir.is_empty());
        assert!(s.db_path().ends_with(DB_FILE));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.dealer_name, "Land Automotive");
        assert!(s.api_base.starts_with("https://"));
    }

    #[test]
    fn test_shellexpand_keeps_unknown_paths() {
        assert_eq!(shellexpand_path("/does/not/exist"), "/does/not/exist");
    }
}
