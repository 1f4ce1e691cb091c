//! `tank verify`: confirm every lockfile entry's extraction directory is
//! present (§4.8). The contract leaves open whether files are rehashed;
//! at minimum, presence is checked.

use crate::context::Context;
use crate::lockfile::Lockfile;
use crate::manifest::SkillName;

#[derive(Debug, Clone)]
pub struct VerifyFinding {
    pub key: String,
    pub present: bool,
}

pub fn run(ctx: &Context, global: bool) -> anyhow::Result<Vec<VerifyFinding>> {
    let lockfile = Lockfile::load(&ctx.lockfile_path(global))?;

    let mut findings = Vec::new();
    for key in lockfile.skills.keys() {
        let (name, _version) = key
            .rsplit_once('@')
            .ok_or_else(|| anyhow::anyhow!("malformed lockfile key {key}"))?;
        let skill_name = SkillName::parse(name)?;
        let target_dir = ctx.skills_root(global).join(skill_name.extract_subpath());
        findings.push(VerifyFinding {
            key: key.clone(),
            present: target_dir.is_dir(),
        });
    }

    let missing: Vec<&VerifyFinding> = findings.iter().filter(|f| !f.present).collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "{} skill(s) missing from disk: {}",
            missing.len(),
            missing.iter().map(|f| f.key.as_str()).collect::<Vec<_>>().join(", ")
        );
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::LockEntry;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn reports_missing_skill_as_fatal() {
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

        assert!(run(&ctx, false).is_err());
    }

    #[test]
    fn succeeds_when_extraction_dir_present() {
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
        std::fs::create_dir_all(ctx.skills_root(false).join("demo")).unwrap();

        let findings = run(&ctx, false).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].present);
    }
}
