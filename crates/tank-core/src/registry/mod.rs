//! Registry client (§4.2): typed wrappers over the registry's REST contract.
//!
//! The registry HTTP service itself is an external collaborator (§1); this
//! module only knows how to call it and map its responses to typed errors.

pub mod client;
pub mod schema;

pub use client::RegistryClient;
pub use schema::{
    AuditStatus, PublishConfirmRequest, PublishConfirmResponse, PublishInitResponse,
    SearchResult, SkillInfo, VersionDetail, VersionEntry,
};
