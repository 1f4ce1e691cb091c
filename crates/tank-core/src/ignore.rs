//! Ignore resolution for packing (§4.1).
//!
//! Deterministic order: a baseline of always-ignored patterns that cannot
//! be overridden, then `.tankignore` if present, else `.gitignore`, else a
//! built-in default list. The ignore file itself is never included in the
//! tarball it describes.

use std::fs;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

const BASELINE_PATTERNS: &[&str] = &["node_modules/**", ".git/**", ".tank/**", "**/.DS_Store"];

const DEFAULT_PATTERNS: &[&str] = &["node_modules/**", ".env", ".env.*", "*.log"];

/// The resolved ignore set for a packing root.
pub struct IgnoreSet {
    baseline: GlobSet,
    configured: GlobSet,
    /// Name of the ignore file consulted, if any (it is itself excluded).
    pub ignore_file_name: Option<&'static str>,
}

impl IgnoreSet {
    /// Resolve the effective ignore set for `root`, per §4.1 step 2.
    pub fn resolve(root: &Path) -> anyhow::Result<Self> {
        let baseline = build_glob_set(BASELINE_PATTERNS)?;

        let tankignore = root.join(".tankignore");
        let gitignore = root.join(".gitignore");

        let (patterns, ignore_file_name): (Vec<String>, Option<&'static str>) =
            if tankignore.exists() {
                (read_patterns(&tankignore)?, Some(".tankignore"))
            } else if gitignore.exists() {
                (read_patterns(&gitignore)?, Some(".gitignore"))
            } else {
                (
                    DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect(),
                    None,
                )
            };

        let configured = build_glob_set(&patterns.iter().map(String::as_str).collect::<Vec<_>>())?;

        Ok(Self {
            baseline,
            configured,
            ignore_file_name,
        })
    }

    /// True if `relative_path` (forward-slash separated, root-relative) should
    /// be excluded from the tarball.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        if let Some(name) = self.ignore_file_name {
            if relative_path == name {
                return true;
            }
        }
        self.baseline.is_match(relative_path) || self.configured.is_match(relative_path)
    }
}

fn read_patterns(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize_pattern)
        .collect())
}

/// Turn a gitignore-style line into a glob usable against a root-relative,
/// forward-slash path. A bare `name` (no slash, no wildcard) is treated as
/// matching that name at any depth, matching gitignore semantics.
fn normalize_pattern(pattern: &str) -> String {
    let pattern = pattern.trim_end_matches('/');
    if pattern.contains('/') || pattern.contains('*') {
        pattern.to_string()
    } else {
        format!("**/{pattern}")
    }
}

fn build_glob_set(patterns: &[&str]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let expanded = if pattern.ends_with("/**") || pattern.contains('*') {
            pattern.to_string()
        } else {
            format!("**/{pattern}/**")
        };
        builder.add(Glob::new(pattern)?);
        // Directories named without a trailing /** still need to match their
        // contents; add a second glob covering that case.
        if expanded != *pattern {
            builder.add(Glob::new(&expanded)?);
        }
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn baseline_cannot_be_overridden() {
        let dir = TempDir::new().unwrap();
        let set = IgnoreSet::resolve(dir.path()).unwrap();
        assert!(set.is_ignored("node_modules/pkg/index.js"));
        assert!(set.is_ignored(".git/HEAD"));
        assert!(set.is_ignored(".tank/skills/foo"));
        assert!(set.is_ignored("sub/.DS_Store"));
    }

    #[test]
    fn uses_default_list_when_no_ignore_file() {
        let dir = TempDir::new().unwrap();
        let set = IgnoreSet::resolve(dir.path()).unwrap();
        assert!(set.is_ignored(".env"));
        assert!(set.is_ignored(".env.local"));
        assert!(set.is_ignored("debug.log"));
        assert!(!set.is_ignored("SKILL.md"));
    }

    #[test]
    fn prefers_tankignore_over_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::write(dir.path().join(".tankignore"), "secrets/**\n").unwrap();

        let set = IgnoreSet::resolve(dir.path()).unwrap();
        assert!(set.is_ignored("secrets/key.pem"));
        // .gitignore's *.log is not consulted once .tankignore exists
        assert!(!set.is_ignored("debug.log"));
        // the ignore file itself is excluded
        assert!(set.is_ignored(".tankignore"));
    }

    #[test]
    fn falls_back_to_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "build/**\n").unwrap();

        let set = IgnoreSet::resolve(dir.path()).unwrap();
        assert!(set.is_ignored("build/out.js"));
        assert!(set.is_ignored(".gitignore"));
    }
}
