//! Agent descriptors (§3): the closed set of host AI agents Tank can
//! fan skills out to.

use std::path::PathBuf;

/// A recognized host AI agent: fixed, relative-to-home config and skills
/// directories. The set is closed — adding a new agent means adding a
/// variant here, never reading one from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentId {
    Claude,
    OpenCode,
    Cursor,
    Codex,
    OpenClaw,
    Universal,
}

pub const ALL_AGENTS: &[AgentId] = &[
    AgentId::Claude,
    AgentId::OpenCode,
    AgentId::Cursor,
    AgentId::Codex,
    AgentId::OpenClaw,
    AgentId::Universal,
];

#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    pub id: AgentId,
    /// Absolute path to the agent's own config directory.
    pub config_dir: PathBuf,
    /// Absolute path to the directory Tank symlinks skills into.
    pub skills_dir: PathBuf,
}

impl AgentId {
    pub fn key(&self) -> &'static str {
        match self {
            AgentId::Claude => "claude",
            AgentId::OpenCode => "opencode",
            AgentId::Cursor => "cursor",
            AgentId::Codex => "codex",
            AgentId::OpenClaw => "openclaw",
            AgentId::Universal => "universal",
        }
    }

    fn config_dir_relative(&self) -> &'static str {
        match self {
            AgentId::Claude => ".claude",
            AgentId::OpenCode => ".opencode",
            AgentId::Cursor => ".cursor",
            AgentId::Codex => ".codex",
            AgentId::OpenClaw => ".openclaw",
            AgentId::Universal => ".tank/agents/universal",
        }
    }

    fn skills_dir_relative(&self) -> &'static str {
        match self {
            AgentId::Claude => ".claude/skills",
            AgentId::OpenCode => ".opencode/skills",
            AgentId::Cursor => ".cursor/skills",
            AgentId::Codex => ".codex/skills",
            AgentId::OpenClaw => ".openclaw/skills",
            AgentId::Universal => ".tank/agents/universal/skills",
        }
    }

    pub fn descriptor(&self, home: &std::path::Path) -> AgentDescriptor {
        AgentDescriptor {
            id: *self,
            config_dir: home.join(self.config_dir_relative()),
            skills_dir: home.join(self.skills_dir_relative()),
        }
    }
}

/// Agents whose config directory is present on disk — the link manager's
/// detection rule (§4.7: "parent config dir present; skills subdirectory
/// created on demand").
pub fn detected_agents(home: &std::path::Path) -> Vec<AgentDescriptor> {
    ALL_AGENTS
        .iter()
        .map(|id| id.descriptor(home))
        .filter(|descriptor| descriptor.config_dir.is_dir())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn detects_only_agents_with_existing_config_dirs() {
        let home = TempDir::new().unwrap();
        std::fs::create_dir_all(home.path().join(".claude")).unwrap();

        let detected = detected_agents(home.path());
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].id, AgentId::Claude);
    }

    #[test]
    fn universal_agent_is_always_under_dot_tank() {
        let home = TempDir::new().unwrap();
        let descriptor = AgentId::Universal.descriptor(home.path());
        assert!(descriptor.config_dir.starts_with(home.path().join(".tank")));
    }

    #[test]
    fn keys_are_stable_identifiers() {
        assert_eq!(AgentId::Claude.key(), "claude");
        assert_eq!(AgentId::OpenClaw.key(), "openclaw");
    }
}
