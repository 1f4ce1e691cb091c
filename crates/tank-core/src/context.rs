//! Application context for dependency injection.
//!
//! Mirrors the pattern named in the design notes: a small, explicit value
//! threaded through every command instead of a global mutable CWD-implicit
//! config. Tests construct alternatives with custom paths and a fixed clock.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::ConfigFile;

/// Default registry base URL used when no config file overrides it.
pub const DEFAULT_REGISTRY: &str = "https://tankpkg.dev";

/// Everything a command needs to know about where it's running and who
/// it's running as, gathered once at the CLI boundary.
#[derive(Debug, Clone)]
pub struct Context {
    /// `$HOME` (or platform equivalent).
    pub home: PathBuf,
    /// `<config-dir>`, defaults to `$HOME/.tank`.
    pub config_dir: PathBuf,
    /// Root of the current project (where `skills.json` lives), if any.
    pub project_root: PathBuf,
    /// Registry base URL.
    pub registry: String,
    /// Bearer token, if the user has logged in.
    pub token: Option<String>,
    /// Injectable clock; tests pin this to a fixed instant.
    pub now: DateTime<Utc>,
}

impl Context {
    /// Build a context from the real environment: `$HOME`, `$HOME/.tank`,
    /// the current working directory, and whatever `config.json` contains.
    pub fn discover() -> anyhow::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
        let config_dir = home.join(".tank");
        let project_root = std::env::current_dir()?;
        let config = ConfigFile::load(&config_dir)?;

        let registry = config
            .registry
            .filter(|raw| url::Url::parse(raw).is_ok())
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());

        Ok(Self {
            home,
            config_dir,
            project_root,
            registry,
            token: config.token,
            now: Utc::now(),
        })
    }

    /// Build a context for tests: explicit paths, no token, fixed clock.
    pub fn for_test(home: PathBuf, project_root: PathBuf, now: DateTime<Utc>) -> Self {
        let config_dir = home.join(".tank");
        Self {
            home,
            config_dir,
            project_root,
            registry: DEFAULT_REGISTRY.to_string(),
            token: None,
            now,
        }
    }

    /// Global state directory: `<config_dir>/skills`, `<config_dir>/skills.lock`, etc.
    pub fn global_state_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// `.tank` directory for the current project.
    pub fn project_tank_dir(&self) -> PathBuf {
        self.project_root.join(".tank")
    }

    /// Root under which extracted skills live for a given scope.
    pub fn skills_root(&self, global: bool) -> PathBuf {
        if global {
            self.global_state_dir().join("skills")
        } else {
            self.project_tank_dir().join("skills")
        }
    }

    pub fn lockfile_path(&self, global: bool) -> PathBuf {
        if global {
            self.global_state_dir().join("skills.lock")
        } else {
            self.project_root.join("skills.lock")
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join("skills.json")
    }

    pub fn links_manifest_path(&self, global: bool) -> PathBuf {
        if global {
            self.global_state_dir().join("links.json")
        } else {
            self.project_tank_dir().join("links.json")
        }
    }

    pub fn agent_skills_root(&self, global: bool) -> PathBuf {
        if global {
            self.global_state_dir().join("agent-skills")
        } else {
            self.project_tank_dir().join("agent-skills")
        }
    }

    pub fn root_for(&self, global: bool) -> &Path {
        if global {
            &self.config_dir
        } else {
            &self.project_root
        }
    }
}
