//! `tank remove`: delete an installed skill's extracted tree, lockfile
//! entry, manifest dependency, and agent links (§4.8).

use std::fs;

use crate::context::Context;
use crate::link::{self, LinksManifest};
use crate::lockfile::Lockfile;
use crate::manifest::SkillManifest;

pub struct RemoveOutcome {
    pub name: String,
    pub broken_links: usize,
}

pub fn run(ctx: &Context, name: &str, global: bool) -> anyhow::Result<RemoveOutcome> {
    let skill_name = crate::manifest::SkillName::parse(name)?;

    let lockfile_path = ctx.lockfile_path(global);
    let mut lockfile = Lockfile::load(&lockfile_path)?;

    let version = lockfile
        .skills
        .keys()
        .find(|key| key.starts_with(&format!("{}@", skill_name)))
        .cloned()
        .and_then(|key| key.rsplit_once('@').map(|(_, v)| v.to_string()));

    if let Some(version) = &version {
        lockfile.remove(&skill_name.to_string(), version);
        lockfile.save(&lockfile_path)?;
    }

    let target_dir = ctx.skills_root(global).join(skill_name.extract_subpath());
    if target_dir.exists() {
        fs::remove_dir_all(&target_dir)?;
    }

    if !global {
        let manifest_path = ctx.manifest_path();
        if manifest_path.is_file() {
            let mut manifest = SkillManifest::parse(&fs::read(&manifest_path)?)?;
            manifest.skills.remove(&skill_name.to_string());
            fs::write(&manifest_path, manifest.to_bytes_pretty())?;
        }
    }

    let links_path = ctx.links_manifest_path(global);
    let mut links_manifest = LinksManifest::load(&links_path)?;
    let wrapper_root = ctx.agent_skills_root(global);
    let broken_links = link::unlink(&mut links_manifest, &skill_name.to_string(), &wrapper_root)?;
    links_manifest.save(&links_path)?;

    tracing::info!(name = %skill_name, broken_links, "removed skill");

    Ok(RemoveOutcome {
        name: skill_name.to_string(),
        broken_links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::LockEntry;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn removes_lockfile_entry_and_extracted_tree() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());

        let mut lockfile = Lockfile::load(&ctx.lockfile_path(false)).unwrap();
        lockfile.insert(
            "demo",
            "1.0.0",
            LockEntry {
                resolved: "1.0.0".to_string(),
                integrity: "sha512-x".to_string(),
                permissions: None,
                audit_score: None,
            },
        );
        lockfile.save(&ctx.lockfile_path(false)).unwrap();

        let target_dir = ctx.skills_root(false).join("demo");
        fs::create_dir_all(&target_dir).unwrap();

        let outcome = run(&ctx, "demo", false).unwrap();
        assert_eq!(outcome.name, "demo");
        assert!(!target_dir.exists());

        let reloaded = Lockfile::load(&ctx.lockfile_path(false)).unwrap();
        assert!(reloaded.skills.is_empty());
    }
}
