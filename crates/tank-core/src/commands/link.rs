//! `tank link` / `tank unlink`: dev-link a skill's working directory into
//! every detected host agent (§4.7).

use std::fs;
use std::path::Path;

use crate::context::Context;
use crate::link::{self as linker, LinkSource, LinksManifest};
use crate::manifest::{SkillManifest, SkillName};

pub fn link(ctx: &Context, dir: &Path) -> anyhow::Result<String> {
    let manifest = SkillManifest::parse(&fs::read(dir.join("skills.json"))?)?;

    let links_path = ctx.links_manifest_path(false);
    let mut manifest_file = LinksManifest::load(&links_path)?;
    let wrapper_root = ctx.agent_skills_root(false);

    linker::link(
        &mut manifest_file,
        &manifest.name,
        &manifest.version.to_string(),
        LinkSource::Dev,
        dir,
        &wrapper_root,
        &ctx.home,
        ctx.now,
    )?;
    manifest_file.save(&links_path)?;

    tracing::info!(name = %manifest.name, dir = %dir.display(), "linked dev skill");
    Ok(manifest.name.to_string())
}

pub fn unlink(ctx: &Context, name: &str) -> anyhow::Result<usize> {
    let skill_name = SkillName::parse(name)?;
    let links_path = ctx.links_manifest_path(false);
    let mut manifest_file = LinksManifest::load(&links_path)?;
    let wrapper_root = ctx.agent_skills_root(false);

    let broken = linker::unlink(&mut manifest_file, &skill_name.to_string(), &wrapper_root)?;
    manifest_file.save(&links_path)?;

    tracing::info!(name = %skill_name, broken, "unlinked skill");
    Ok(broken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    #[cfg(unix)]
    fn dev_link_round_trips() {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".claude")).unwrap();
        let project = TempDir::new().unwrap();
        let ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());

        let skill_dir = TempDir::new().unwrap();
        fs::write(skill_dir.path().join("skills.json"), r#"{"name":"demo","version":"1.0.0"}"#).unwrap();
        fs::write(skill_dir.path().join("SKILL.md"), "# demo").unwrap();

        let name = link(&ctx, skill_dir.path()).unwrap();
        assert_eq!(name, "demo");

        let wrapper_skill_md = ctx.agent_skills_root(false).join("demo").join("SKILL.md");
        let stub = fs::read_to_string(&wrapper_skill_md).unwrap();
        assert!(stub.starts_with("---\nname: demo\nversion: 1.0.0\n---\n"));

        let broken = unlink(&ctx, "demo").unwrap();
        assert_eq!(broken, 0);
    }
}
