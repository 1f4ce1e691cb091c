//! `tank init`: scaffold a consumer project's `skills.json`.

use std::fs;

use semver::Version;

use crate::context::Context;
use crate::manifest::{SkillManifest, SkillName};

pub fn run(ctx: &Context, name: &str, description: &str) -> anyhow::Result<()> {
    let manifest_path = ctx.manifest_path();
    if manifest_path.exists() {
        anyhow::bail!("{} already exists", manifest_path.display());
    }

    let manifest = SkillManifest {
        name: SkillName::parse(name)?,
        version: Version::new(0, 1, 0),
        description: description.to_string(),
        repository_url: None,
        skills: Default::default(),
        permissions: None,
    };

    fs::write(&manifest_path, manifest.to_bytes_pretty())?;
    tracing::info!(path = %manifest_path.display(), "initialized skills.json");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn creates_manifest_with_defaults() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());

        run(&ctx, "my-skill", "a demo skill").unwrap();

        let manifest = SkillManifest::parse(&fs::read(ctx.manifest_path()).unwrap()).unwrap();
        assert_eq!(manifest.name.to_string(), "my-skill");
        assert_eq!(manifest.version, Version::new(0, 1, 0));
    }

    #[test]
    fn refuses_to_overwrite_existing_manifest() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());

        run(&ctx, "my-skill", "demo").unwrap();
        assert!(run(&ctx, "my-skill", "demo").is_err());
    }
}
