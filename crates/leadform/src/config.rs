use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "LEADFORM_API_URL";
pub const ENV_API_TOKEN: &str = "LEADFORM_API_TOKEN";
pub const ENV_STORAGE: &str = "LEADFORM_STORAGE";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Backend root, e.g. `https://api.example.com/v1`. Without it forms are
    /// pushed to `forms_dir`.
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub storage_path: Option<PathBuf>,
    pub forms_dir: Option<PathBuf>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage_path: None,
            forms_dir: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "leadform")
}

fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".leadform"))
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

impl BuilderConfig {
    /// Reads `explicit` (which must exist) or the default config file (which
    /// may be missing), then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(token) = non_empty(ENV_API_TOKEN) {
            self.api_token = Some(token);
        }
        if let Some(storage) = non_empty(ENV_STORAGE) {
            self.storage_path = Some(PathBuf::from(storage));
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| data_dir().join("storage.json"))
    }

    pub fn forms_dir(&self) -> PathBuf {
        self.forms_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("forms"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = BuilderConfig::from_toml("").expect("parse");
        assert_eq!(config, BuilderConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parses_every_key() {
        let config = BuilderConfig::from_toml(
            r#"
api_base_url = "https://api.example.com/v1"
api_token = "t0k"
timeout_secs = 5
storage_path = "/tmp/storage.json"
forms_dir = "/tmp/forms"
"#,
        )
        .expect("parse");
        assert_eq!(config.api_base_url.as_deref(), Some("https://api.example.com/v1"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/storage.json"));
        assert_eq!(config.forms_dir(), PathBuf::from("/tmp/forms"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(BuilderConfig::from_toml("api_url = \"x\"").is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = BuilderConfig {
            api_base_url: Some("https://file.example.com".into()),
            ..BuilderConfig::default()
        };
        config.apply_env(|key| match key {
            ENV_API_URL => Some("https://env.example.com".into()),
            ENV_API_TOKEN => Some("   ".into()),
            ENV_STORAGE => Some("/data/storage.json".into()),
            _ => None,
        });
        assert_eq!(config.api_base_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.api_token, None);
        assert_eq!(config.storage_path(), PathBuf::from("/data/storage.json"));
    }
}
