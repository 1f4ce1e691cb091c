//! Client-side core of Tank, a security-first package manager for AI-agent
//! skills: manifest parsing, packing, registry I/O, version resolution,
//! permission budget checks, safe download/extraction, lockfile and link
//! management, and the command orchestrator that composes them.

pub mod agents;
pub mod commands;
pub mod config;
pub mod context;
pub mod download;
pub mod error;
pub mod extract;
pub mod ignore;
pub mod integrity;
pub mod link;
pub mod lockfile;
pub mod manifest;
pub mod pack;
pub mod permissions;
pub mod registry;
pub mod resolver;

pub mod prelude {
    pub use crate::agents::{AgentDescriptor, AgentId};
    pub use crate::context::Context;
    pub use crate::error::TankError;
    pub use crate::lockfile::{LockEntry, Lockfile};
    pub use crate::manifest::{Permissions, SkillManifest, SkillName};
    pub use crate::registry::RegistryClient;
}
