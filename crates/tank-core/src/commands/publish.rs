//! `tank publish`: the READY -> VALIDATED -> PACKED -> RESERVED ->
//! UPLOADED -> COMPLETE state machine of §4.8.

use std::fs;
use std::path::Path;

use crate::context::Context;
use crate::error::RegistryError;
use crate::manifest::SkillManifest;
use crate::pack;
use crate::registry::{PublishConfirmRequest, RegistryClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Ready,
    Validated,
    Packed,
    Reserved,
    Uploaded,
    Complete,
}

pub struct PublishOutcome {
    pub state: PublishState,
    pub version: Option<String>,
}

/// Run the publish state machine against `dir`. `dry_run` aborts after
/// `Packed` with no network side effects.
pub async fn run(ctx: &Context, dir: &Path, dry_run: bool) -> anyhow::Result<PublishOutcome> {
    tracing::info!(dir = %dir.display(), "publish: READY");

    let manifest_bytes = fs::read(dir.join("skills.json"))?;
    let manifest = SkillManifest::parse_for_publish(&manifest_bytes)?;
    tracing::info!(name = %manifest.name, version = %manifest.version, "publish: VALIDATED");

    let packed = pack::pack(dir)?;
    tracing::info!(file_count = packed.file_count, integrity = %packed.integrity, "publish: PACKED");

    if dry_run {
        return Ok(PublishOutcome {
            state: PublishState::Packed,
            version: None,
        });
    }

    let client = RegistryClient::new(ctx.registry.clone(), ctx.token.clone());

    let init = client.publish_init(&manifest).await?;
    tracing::info!(skill_id = %init.skill_id, version_id = %init.version_id, "publish: RESERVED");

    client.upload(&init.upload_url, packed.tarball.clone()).await?;
    tracing::info!("publish: UPLOADED");

    let confirm = client
        .publish_confirm(&PublishConfirmRequest {
            version_id: init.version_id,
            integrity: packed.integrity,
            file_count: packed.file_count,
            tarball_size: packed.total_size,
            readme: read_readme(dir),
        })
        .await
        .map_err(version_exists_on_conflict)?;
    tracing::info!(version = %confirm.version, "publish: COMPLETE");

    Ok(PublishOutcome {
        state: PublishState::Complete,
        version: Some(confirm.version),
    })
}

fn read_readme(dir: &Path) -> Option<String> {
    fs::read_to_string(dir.join("SKILL.md")).ok()
}

/// `publish_confirm`'s 409 carries publish-specific semantics (§7: "409 on
/// publish: VersionExists, surface as 'bump the version'") on top of the
/// generic `Conflict` mapping every other registry endpoint uses.
fn version_exists_on_conflict(err: RegistryError) -> RegistryError {
    match err {
        RegistryError::Conflict(_) => RegistryError::VersionExists,
        other => other,
    }
}
