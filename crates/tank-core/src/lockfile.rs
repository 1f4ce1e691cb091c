//! Lockfile manager (§4.6): deterministic `skills.lock`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LockfileError;
use crate::manifest::Permissions;

const LOCKFILE_VERSION: u32 = 1;

/// One resolved, installed skill. Field order matches §4.6's stable layout:
/// `{resolved, integrity, permissions, audit_score}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockEntry {
    pub resolved: String,
    pub integrity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_score: Option<f64>,
}

/// `skills.lock`. Keys are `<name>@<version>`; `BTreeMap` keeps them in
/// lexicographic order on every serialization without a manual sort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lockfile {
    #[serde(rename = "lockfileVersion")]
    pub lockfile_version: u32,
    pub skills: BTreeMap<String, LockEntry>,
}

impl Default for Lockfile {
    fn default() -> Self {
        Self {
            lockfile_version: LOCKFILE_VERSION,
            skills: BTreeMap::new(),
        }
    }
}

impl Lockfile {
    /// Read `path`. A missing file yields an empty lockfile; malformed JSON
    /// is a fatal error (never silently discarded).
    pub fn load(path: &Path) -> Result<Self, LockfileError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default())
            }
            Err(err) => return Err(LockfileError::Io(err)),
        };

        let lockfile: Lockfile =
            serde_json::from_slice(&bytes).map_err(|source| LockfileError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        if lockfile.lockfile_version != LOCKFILE_VERSION {
            return Err(LockfileError::UnsupportedVersion(lockfile.lockfile_version));
        }

        Ok(lockfile)
    }

    /// Write `path`, regenerating the file in full: pretty-printed, 2-space
    /// indent, trailing newline, keys in lexicographic order.
    pub fn save(&self, path: &Path) -> Result<(), LockfileError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut bytes = serde_json::to_vec_pretty(self).expect("Lockfile always serializes");
        bytes.push(b'\n');
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn key(name: &str, version: &str) -> String {
        format!("{name}@{version}")
    }

    pub fn get(&self, name: &str, version: &str) -> Option<&LockEntry> {
        self.skills.get(&Self::key(name, version))
    }

    pub fn insert(&mut self, name: &str, version: &str, entry: LockEntry) {
        self.skills.insert(Self::key(name, version), entry);
    }

    pub fn remove(&mut self, name: &str, version: &str) -> Option<LockEntry> {
        self.skills.remove(&Self::key(name, version))
    }
}
