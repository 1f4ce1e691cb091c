//! Command orchestrator (§4.8): composes the leaf subsystems into the
//! state machines backing `init`, `publish`, `install`, `update`,
//! `remove`, `verify`, `audit`, `search`, `info`, `link`, `unlink`,
//! `doctor`, and the auth commands.
//!
//! Each command function takes a `&Context` plus its own arguments and
//! returns `anyhow::Result<_>` — this is the orchestration boundary named
//! in the ambient stack; subsystems below it keep their own narrow typed
//! errors.

pub mod audit;
pub mod auth;
pub mod doctor;
pub mod init;
pub mod install;
pub mod link;
pub mod permissions;
pub mod publish;
pub mod remove;
pub mod search;
pub mod update;
pub mod verify;
