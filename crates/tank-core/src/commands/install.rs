//! `tank install`: the RESOLVE -> META -> POLICY_CHECK -> DOWNLOAD ->
//! EXTRACT -> RECORD -> LINK state machine of §4.8, plus
//! install-from-lockfile fan-out with bounded concurrency.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::context::Context;
use crate::link::{self, LinkSource, LinksManifest};
use crate::lockfile::{LockEntry, Lockfile};
use crate::manifest::{Permissions, SkillManifest, SkillName};
use crate::permissions;
use crate::registry::RegistryClient;
use crate::{download, extract, resolver};

/// Maximum concurrent HTTP requests during lockfile-driven installs (§5).
const MAX_CONCURRENT_INSTALLS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    AlreadyInstalled,
    Installed,
}

pub struct InstallOutcome {
    pub name: String,
    pub version: String,
    pub state: InstallState,
    pub warnings: Vec<String>,
}

/// Install a single named skill at `range` (defaults to `"*"`), resolving
/// against the registry and writing through lockfile + link manager.
pub async fn install_one(
    ctx: &Context,
    name: &str,
    range: &str,
    global: bool,
    project_budget: &Option<Permissions>,
) -> anyhow::Result<InstallOutcome> {
    let skill_name = SkillName::parse(name)?;
    let client = RegistryClient::new(ctx.registry.clone(), ctx.token.clone());

    tracing::info!(name, range, "install: RESOLVE");
    let versions = client.list_versions(&skill_name.to_string()).await?;
    let resolved = resolver::resolve(name, range, &versions)?.clone();

    let lockfile_path = ctx.lockfile_path(global);
    let mut lockfile = Lockfile::load(&lockfile_path)?;

    if let Some(existing) = lockfile.get(&skill_name.to_string(), &resolved.version) {
        let target_dir = skill_target_dir(ctx, &skill_name, global);
        if existing.integrity == resolved.integrity && target_dir.is_dir() {
            tracing::info!(name, version = %resolved.version, "install: already installed");
            link_installed(ctx, &skill_name, &resolved.version, global)?;
            return Ok(InstallOutcome {
                name: skill_name.to_string(),
                version: resolved.version.clone(),
                state: InstallState::AlreadyInstalled,
                warnings: Vec::new(),
            });
        }
    }

    tracing::info!(name, version = %resolved.version, "install: META");
    let detail = client.get_version(&skill_name.to_string(), &resolved.version).await?;

    tracing::info!(name, "install: POLICY_CHECK");
    let warnings = permissions::check(&detail.permissions, project_budget)?;

    tracing::info!(name, "install: DOWNLOAD");
    let http = reqwest::Client::new();
    let bytes = download::fetch_and_verify(
        &http,
        &skill_name.to_string(),
        &detail.download_url,
        &detail.entry.integrity,
    )
    .await?;

    tracing::info!(name, "install: EXTRACT");
    let target_dir = skill_target_dir(ctx, &skill_name, global);
    if let Err(err) = extract::extract(&bytes, &target_dir) {
        rollback_skills_tree(ctx, global)?;
        return Err(err.into());
    }

    tracing::info!(name, "install: RECORD");
    lockfile.insert(
        &skill_name.to_string(),
        &resolved.version,
        LockEntry {
            resolved: resolved.version.clone(),
            integrity: resolved.integrity.clone(),
            permissions: detail.permissions.clone(),
            audit_score: resolved.audit_score,
        },
    );
    lockfile.save(&lockfile_path)?;

    if !global {
        record_dependency(ctx, &skill_name, range)?;
    }

    tracing::info!(name, "install: LINK");
    link_installed(ctx, &skill_name, &resolved.version, global)?;

    Ok(InstallOutcome {
        name: skill_name.to_string(),
        version: resolved.version,
        state: InstallState::Installed,
        warnings,
    })
}

/// Install every entry already present in `skills.lock`/global lockfile.
/// Downloads may complete in any order; extraction is serialized per skill
/// by construction (each skill owns a distinct target directory). Any
/// failure rolls back the entire `.tank/skills` tree.
pub async fn install_from_lockfile(ctx: &Context, global: bool) -> anyhow::Result<Vec<InstallOutcome>> {
    let lockfile_path = ctx.lockfile_path(global);
    let lockfile = Lockfile::load(&lockfile_path)?;

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_INSTALLS));
    let mut tasks = FuturesUnordered::new();

    for (key, entry) in lockfile.skills.clone() {
        let semaphore = semaphore.clone();
        let ctx = ctx.clone();
        tasks.push(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            install_lockfile_entry(&ctx, &key, &entry, global).await
        });
    }

    let mut outcomes = Vec::new();
    while let Some(result) = tasks.next().await {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                rollback_skills_tree(ctx, global)?;
                return Err(err);
            }
        }
    }

    Ok(outcomes)
}

async fn install_lockfile_entry(
    ctx: &Context,
    key: &str,
    entry: &LockEntry,
    global: bool,
) -> anyhow::Result<InstallOutcome> {
    let (name, _version) = key
        .rsplit_once('@')
        .ok_or_else(|| anyhow::anyhow!("malformed lockfile key {key}"))?;
    let skill_name = SkillName::parse(name)?;

    let client = RegistryClient::new(ctx.registry.clone(), ctx.token.clone());
    let detail = client.get_version(&skill_name.to_string(), &entry.resolved).await?;

    let http = reqwest::Client::new();
    let bytes = download::fetch_and_verify(
        &http,
        &skill_name.to_string(),
        &detail.download_url,
        &entry.integrity,
    )
    .await?;

    let target_dir = skill_target_dir(ctx, &skill_name, global);
    extract::extract(&bytes, &target_dir)?;
    link_installed(ctx, &skill_name, &entry.resolved, global)?;

    Ok(InstallOutcome {
        name: skill_name.to_string(),
        version: entry.resolved.clone(),
        state: InstallState::Installed,
        warnings: Vec::new(),
    })
}

fn skill_target_dir(ctx: &Context, skill_name: &SkillName, global: bool) -> std::path::PathBuf {
    ctx.skills_root(global).join(skill_name.extract_subpath())
}

fn rollback_skills_tree(ctx: &Context, global: bool) -> anyhow::Result<()> {
    let root = ctx.skills_root(global);
    if root.exists() {
        std::fs::remove_dir_all(&root)?;
    }
    tracing::warn!(root = %root.display(), "install failed: rolled back skills tree");
    Ok(())
}

fn link_installed(ctx: &Context, skill_name: &SkillName, version: &str, global: bool) -> anyhow::Result<()> {
    let links_path = ctx.links_manifest_path(global);
    let mut manifest = LinksManifest::load(&links_path)?;
    let source_dir = skill_target_dir(ctx, skill_name, global);
    let wrapper_root = ctx.agent_skills_root(global);
    let source = if global { LinkSource::Global } else { LinkSource::Local };

    link::link(
        &mut manifest,
        skill_name,
        version,
        source,
        &source_dir,
        &wrapper_root,
        &ctx.home,
        ctx.now,
    )?;
    manifest.save(&links_path)?;
    Ok(())
}

fn record_dependency(ctx: &Context, skill_name: &SkillName, range: &str) -> anyhow::Result<()> {
    let manifest_path = ctx.manifest_path();
    let mut manifest = if manifest_path.is_file() {
        SkillManifest::parse(&std::fs::read(&manifest_path)?)?
    } else {
        return Ok(());
    };
    manifest.skills.insert(skill_name.to_string(), range.to_string());
    std::fs::write(&manifest_path, manifest.to_bytes_pretty())?;
    Ok(())
}
