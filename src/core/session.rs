//! Explicit Dolibarr session passed to the API client
//!
//! The saved session is plain YAML in the data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;

pub const SESSION_FILE: &str = "session.yaml";

/// Connection details for one Dolibarr server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Server root, without the `/api/index.php` suffix
    pub base_url: String,
    /// DOLAPIKEY token
    pub api_key: String,
    /// Login of the sales representative
    pub username: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not logged in: run 'dolisales login' or set dolibarr_url and api_key in the config")]
    Missing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid session file: {0}")]
    Format(#[from] serde_yml::Error),
}

impl Session {
    pub fn new(base_url: &str, api_key: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            base_url: normalize_url(base_url),
            api_key: api_key.into(),
            username: username.into(),
        }
    }

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SESSION_FILE)
    }

    /// Resolve the session: explicit config wins over the saved login
    pub fn resolve(config: &Config, data_dir: &Path) -> Result<Self, SessionError> {
        if let (Some(url), Some(key)) = (&config.dolibarr_url, &config.api_key) {
            return Ok(Self::new(url, key.clone(), config.user()));
        }
        Self::load(data_dir)?.ok_or(SessionError::Missing)
    }

    pub fn load(data_dir: &Path) -> Result<Option<Self>, SessionError> {
        match std::fs::read_to_string(Self::path(data_dir)) {
            Ok(text) => Ok(Some(serde_yml::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), SessionError> {
        std::fs::create_dir_all(data_dir)?;
        std::fs::write(Self::path(data_dir), serde_yml::to_string(self)?)?;
        Ok(())
    }

    /// Forget the saved login; succeeds when there was none
    pub fn forget(data_dir: &Path) -> Result<(), SessionError> {
        match std::fs::remove_file(Self::path(data_dir)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// REST endpoint root
    pub fn api_root(&self) -> String {
        api_root(&self.base_url)
    }
}

/// Trim whitespace and trailing slashes from a server URL
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub fn api_root(base_url: &str) -> String {
    format!("{}/api/index.php", normalize_url(base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let session = Session::new("https://erp.example.com/", "KEY", "vendeur1");
        session.save(dir.path()).unwrap();

        let loaded = Session::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.api_root(), "https://erp.example.com/api/index.php");

        Session::forget(dir.path()).unwrap();
        Session::forget(dir.path()).unwrap();
        assert!(Session::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_config_overrides_saved_session() {
        let dir = tempdir().unwrap();
        Session::new("https://old.example.com", "OLD", "a")
            .save(dir.path())
            .unwrap();

        let config = Config {
            user: Some("b".to_string()),
            dolibarr_url: Some("https://new.example.com".to_string()),
            api_key: Some("NEW".to_string()),
            ..Default::default()
        };
        let session = Session::resolve(&config, dir.path()).unwrap();
        assert_eq!(session.base_url, "https://new.example.com");
        assert_eq!(session.username, "b");
    }

    #[test]
    fn test_missing_session() {
        let dir = tempdir().unwrap();
        let err = Session::resolve(&Config::default(), dir.path()).unwrap_err();
        assert!(matches!(err, SessionError::Missing));
    }
}
