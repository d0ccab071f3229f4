use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::error::API_KEY_ENV;

/// Environment variable that overrides the API base URL.
pub const BASE_URL_ENV: &str = "WEATHERLY_BASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.openweathermap.org/data/2.5/"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,

    /// Optional override of the provider base URL.
    pub base_url: Option<String>,
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherly", "weatherly")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// The credential to use: `WEATHERLY_API_KEY` if set and non-blank, else
    /// the stored key, else the empty "not configured" sentinel.
    pub fn resolved_api_key(&self) -> String {
        pick(env::var(API_KEY_ENV).ok(), self.api_key.as_deref()).unwrap_or_default()
    }

    /// Base URL override from `WEATHERLY_BASE_URL` or the file, if any.
    pub fn resolved_base_url(&self) -> Option<String> {
        pick(env::var(BASE_URL_ENV).ok(), self.base_url.as_deref())
    }
}

fn pick(from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    from_env
        .filter(|v| !v.trim().is_empty())
        .or_else(|| from_file.filter(|v| !v.trim().is_empty()).map(str::to_owned))
}

/// Loggable form of a credential: the first four characters, or `EMPTY`.
pub fn mask_credential(credential: &str) -> String {
    if credential.trim().is_empty() {
        return "EMPTY".to_string();
    }
    let head: String = credential.chars().take(4).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_key_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("  OPEN_KEY \n".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("OPEN_KEY"));
        assert!(loaded.base_url.is_none());
    }

    #[test]
    fn load_from_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [unterminated").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_value_wins_over_file_unless_blank() {
        assert_eq!(pick(Some("ENV".into()), Some("FILE")), Some("ENV".into()));
        assert_eq!(pick(Some("   ".into()), Some("FILE")), Some("FILE".into()));
        assert_eq!(pick(None, Some("FILE")), Some("FILE".into()));
        assert_eq!(pick(None, Some("")), None);
        assert_eq!(pick(None, None), None);
    }

    #[test]
    fn mask_credential_shows_only_prefix() {
        assert_eq!(mask_credential(""), "EMPTY");
        assert_eq!(mask_credential("  "), "EMPTY");
        assert_eq!(mask_credential("abcdef123456"), "abcd...");
        assert_eq!(mask_credential("ab"), "ab...");
    }
}
