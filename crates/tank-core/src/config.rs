//! `<config-dir>/config.json` — registry URL, bearer token, user identity.
//!
//! Deliberately simple: a single JSON document read/write, no scopes, no
//! merge semantics. The registry HTTP service and auth flows that populate
//! `token`/`user` are external collaborators (§1); this module only owns
//! the on-disk representation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ConfigFile {
    fn path(config_dir: &Path) -> PathBuf {
        config_dir.join("config.json")
    }

    /// Load `config.json`, returning an empty config if the file doesn't exist.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(config_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Write `config.json`, creating the config directory if needed and
    /// restricting the file to owner read/write on POSIX.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;
        let path = Self::path(config_dir);
        let content = serde_json::to_string_pretty(self).expect("ConfigFile always serializes");
        fs::write(&path, content).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        restrict_to_owner(&path).map_err(|source| ConfigError::Write { path, source })?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_default() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load(dir.path()).unwrap();
        assert!(config.registry.is_none());
        assert!(config.token.is_none());
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile {
            registry: Some("https://registry.example.com".to_string()),
            token: Some("secret-token".to_string()),
            user: Some("alice".to_string()),
        };
        config.save(dir.path()).unwrap();

        let loaded = ConfigFile::load(dir.path()).unwrap();
        assert_eq!(loaded.registry, config.registry);
        assert_eq!(loaded.token, config.token);
        assert_eq!(loaded.user, config.user);
    }

    #[test]
    #[cfg(unix)]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let config = ConfigFile {
            token: Some("secret".to_string()),
            ..Default::default()
        };
        config.save(dir.path()).unwrap();

        let meta = fs::metadata(dir.path().join("config.json")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{not json").unwrap();
        assert!(ConfigFile::load(dir.path()).is_err());
    }
}
