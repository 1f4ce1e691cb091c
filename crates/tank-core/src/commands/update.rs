//! `tank update`: re-resolve one or all dependencies against current
//! registry listings, installing only those whose resolved version
//! differs from the lockfile (§4.8).

use crate::context::Context;
use crate::lockfile::Lockfile;
use crate::manifest::{Permissions, SkillManifest};
use crate::registry::RegistryClient;
use crate::resolver;

use super::install::{install_one, InstallOutcome};

/// Update `name`, or every dependency in `skills.json` when `name` is
/// `None`. Missing lockfile treats everything as new; already-latest is a
/// non-error no-op. Global update uses the user-home lockfile and does
/// not require `skills.json`.
pub async fn run(
    ctx: &Context,
    name: Option<&str>,
    global: bool,
) -> anyhow::Result<Vec<InstallOutcome>> {
    let dependencies = if global {
        // Global update has no manifest to consult; re-resolve whatever is
        // already in the global lockfile against `"*"`.
        let lockfile = Lockfile::load(&ctx.lockfile_path(true))?;
        lockfile
            .skills
            .keys()
            .filter_map(|key| key.split_once('@').map(|(n, _)| (n.to_string(), "*".to_string())))
            .collect::<Vec<_>>()
    } else {
        let manifest_path = ctx.manifest_path();
        if !manifest_path.is_file() {
            return Ok(Vec::new());
        }
        let manifest = SkillManifest::parse(&std::fs::read(&manifest_path)?)?;
        manifest
            .skills
            .into_iter()
            .collect::<Vec<_>>()
    };

    let targets: Vec<(String, String)> = match name {
        Some(name) => dependencies
            .into_iter()
            .filter(|(dep_name, _)| dep_name == name)
            .collect(),
        None => dependencies,
    };

    let budget = load_budget(ctx, global)?;
    let client = RegistryClient::new(ctx.registry.clone(), ctx.token.clone());
    let lockfile = Lockfile::load(&ctx.lockfile_path(global))?;

    let mut outcomes = Vec::new();
    for (dep_name, range) in targets {
        let versions = client.list_versions(&dep_name).await?;
        let resolved = resolver::resolve(&dep_name, &range, &versions)?;

        let already_latest = lockfile
            .get(&dep_name, &resolved.version)
            .map(|entry| entry.integrity == resolved.integrity)
            .unwrap_or(false);

        if already_latest {
            tracing::info!(name = %dep_name, version = %resolved.version, "update: already latest");
            continue;
        }

        outcomes.push(install_one(ctx, &dep_name, &range, global, &budget).await?);
    }

    Ok(outcomes)
}

fn load_budget(ctx: &Context, global: bool) -> anyhow::Result<Option<Permissions>> {
    if global {
        return Ok(None);
    }
    let manifest_path = ctx.manifest_path();
    if !manifest_path.is_file() {
        return Ok(None);
    }
    let manifest = SkillManifest::parse(&std::fs::read(&manifest_path)?)?;
    Ok(manifest.permissions)
}
