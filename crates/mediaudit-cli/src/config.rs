//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use mediaudit_extractor::DEFAULT_MODELS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, loaded from `~/.mediaudit/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API credentials, tried in order
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Model ladder, tried in order per credential
    #[serde(default)]
    pub models: Vec<String>,

    /// Where the campaign record and cursors live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,
}

impl Config {
    /// Default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".mediaudit").join("config.toml"))
    }

    /// Load configuration from `path`, or the defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Credentials from the config file plus the `GEMINI_API_KEY` /
    /// `GEMINI_API_KEY2` environment variables, env vars first.
    pub fn credentials(&self) -> Vec<String> {
        let mut pool = Vec::new();
        for var in ["GEMINI_API_KEY", "GEMINI_API_KEY2"] {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    pool.push(key);
                }
            }
        }
        for key in &self.api_keys {
            if !key.trim().is_empty() && !pool.contains(key) {
                pool.push(key.clone());
            }
        }
        pool
    }

    /// Configured model ladder, or the built-in default.
    pub fn models(&self) -> Vec<String> {
        if self.models.is_empty() {
            DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
        } else {
            self.models.clone()
        }
    }

    /// State file path, configured or default.
    pub fn state_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.state_path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".mediaudit").join("state.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(config.api_keys.is_empty());
        assert_eq!(config.models(), vec!["gemini-3-flash-preview".to_string()]);
    }

    #[test]
    fn test_parse_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_keys = [\"k1\", \"k2\"]\nmodels = [\"gemini-3-flash-preview\", \"gemini-1.5-pro\"]\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_keys.len(), 2);
        assert_eq!(config.models().len(), 2);
    }
}
