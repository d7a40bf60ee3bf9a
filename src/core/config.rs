//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::store::history::DEFAULT_CAPACITY;

/// File name of the config file, both globally and in the data directory
pub const CONFIG_FILE: &str = "config.yaml";

/// dolisales configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sales representative recorded as `utilisateur` on new records
    pub user: Option<String>,

    /// Dolibarr base URL, e.g. `https://erp.example.com`
    pub dolibarr_url: Option<String>,

    /// Dolibarr API key (DOLAPIKEY)
    pub api_key: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// How many server URLs the login history keeps
    pub history_size: Option<usize>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(data_dir: &Path) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/dolisales/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Data directory config
        if let Some(local) = Self::read_file(&data_dir.join(CONFIG_FILE)) {
            config.merge(local);
        }

        // 4. Environment variables
        if let Ok(user) = std::env::var("DOLISALES_USER") {
            config.user = Some(user);
        }
        if let Ok(url) = std::env::var("DOLISALES_URL") {
            config.dolibarr_url = Some(url);
        }
        if let Ok(key) = std::env::var("DOLISALES_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(size) = std::env::var("DOLISALES_HISTORY_SIZE") {
            match size.parse() {
                Ok(size) => config.history_size = Some(size),
                Err(_) => tracing::warn!(value = %size, "ignoring invalid DOLISALES_HISTORY_SIZE"),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dolisales")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Platform data directory used when none is given
    pub fn default_data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "dolisales")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".dolisales"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.dolibarr_url.is_some() {
            self.dolibarr_url = other.dolibarr_url;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.history_size.is_some() {
            self.history_size = other.history_size;
        }
    }

    /// Get the user name, falling back to the OS user
    pub fn user(&self) -> String {
        if let Some(ref user) = self.user {
            if !user.trim().is_empty() {
                return user.clone();
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn history_size(&self) -> usize {
        self.history_size.unwrap_or(DEFAULT_CAPACITY)
    }

    /// Commented template written by `dolisales init`
    pub fn template() -> &'static str {
        r#"# dolisales configuration
# Values here override the global config; environment variables
# (DOLISALES_USER, DOLISALES_URL, DOLISALES_API_KEY) override both.

# Sales representative recorded on new clients and orders
# user: ""

# Dolibarr server
# dolibarr_url: "https://erp.example.com"
# api_key: ""

# Default output format (auto, json, tsv, csv, id)
# default_format: auto

# Number of server URLs remembered by `dolisales login`
# history_size: 10
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            user: Some("alice".to_string()),
            history_size: Some(5),
            ..Default::default()
        };
        base.merge(Config {
            user: Some("bob".to_string()),
            ..Default::default()
        });
        assert_eq!(base.user.as_deref(), Some("bob"));
        assert_eq!(base.history_size(), 5);
    }

    #[test]
    fn test_template_parses_as_empty_config() {
        let config: Config = serde_yml::from_str(Config::template()).unwrap_or_default();
        assert!(config.user.is_none());
        assert_eq!(config.history_size(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_read_file_parses_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "user: vendeur1\nhistory_size: 3\n").unwrap();
        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.user(), "vendeur1");
        assert_eq!(config.history_size(), 3);
    }

    #[test]
    fn test_blank_user_falls_back() {
        let config = Config {
            user: Some("  ".to_string()),
            ..Default::default()
        };
        assert_ne!(config.user(), "  ");
    }
}
