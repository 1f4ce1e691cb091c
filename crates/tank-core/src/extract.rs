//! Extractor (§4.5, second half): safe tarball unpacking to the skill tree.

use std::fs;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::ExtractError;

/// Extract a gzip tarball into `target_dir`, which is cleaned (recursively
/// removed, then recreated) first so stale files from a prior version
/// cannot survive. Rejects `..`, absolute paths, symlinks/hardlinks, and
/// non-regular entry types. A leading `package/` prefix is stripped.
pub fn extract(tarball: &[u8], target_dir: &Path) -> Result<(), ExtractError> {
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    fs::create_dir_all(target_dir)?;

    let canonical_target = fs::canonicalize(target_dir)?;

    let decoder = GzDecoder::new(tarball);
    let mut archive = tar::Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_type = entry.header().entry_type();

        if entry_type.is_symlink() || entry_type.is_hard_link() {
            return Err(ExtractError::SymlinkEntry(entry.path()?.into_owned()));
        }
        if !entry_type.is_file() && !entry_type.is_dir() {
            return Err(ExtractError::UnsupportedEntryType(entry.path()?.into_owned()));
        }

        let raw_path = entry.path()?.into_owned();
        let Some(relative) = strip_leading_package_prefix(&raw_path) else {
            continue;
        };

        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => return Err(ExtractError::PathTraversal(raw_path)),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ExtractError::AbsolutePath(raw_path))
                }
            }
        }

        let dest = target_dir.join(&relative);

        if entry_type.is_dir() {
            fs::create_dir_all(&dest)?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let canonical_parent = fs::canonicalize(dest.parent().unwrap_or(target_dir))?;
        if !canonical_parent.starts_with(&canonical_target) {
            return Err(ExtractError::PathTraversal(raw_path));
        }

        entry.unpack(&dest)?;
    }

    Ok(())
}

/// npm-compatible: strip a single leading `package/` path component.
/// Entries that are *only* that component (the bare directory entry) are
/// dropped entirely.
fn strip_leading_package_prefix(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "package" => {
            let rest: PathBuf = components.collect();
            if rest.as_os_str().is_empty() {
                None
            } else {
                Some(rest)
            }
        }
        _ => Some(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn build_tarball(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut tar_bytes = Vec::new();
        {
            let mut builder = tar::Builder::new(&mut tar_bytes);
            for (path, content) in entries {
                let mut header = tar::Header::new_gnu();
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append_data(&mut header, path, content.as_bytes()).unwrap();
            }
            builder.finish().unwrap();
        }
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn extracts_regular_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        let tarball = build_tarball(&[("SKILL.md", "# hi"), ("skills.json", "{}")]);
        extract(&tarball, &target).unwrap();
        assert_eq!(fs::read_to_string(target.join("SKILL.md")).unwrap(), "# hi");
        assert_eq!(fs::read_to_string(target.join("skills.json")).unwrap(), "{}");
    }

    #[test]
    fn strips_package_prefix() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        let tarball = build_tarball(&[("package/SKILL.md", "# hi")]);
        extract(&tarball, &target).unwrap();
        assert_eq!(fs::read_to_string(target.join("SKILL.md")).unwrap(), "# hi");
    }

    #[test]
    fn rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        let tarball = build_tarball(&[("../../etc/passwd", "pwned")]);
        let err = extract(&tarball, &target).unwrap_err();
        assert!(matches!(err, ExtractError::PathTraversal(_)));
    }

    #[test]
    fn cleans_target_before_extracting() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale.txt"), "old").unwrap();

        let tarball = build_tarball(&[("SKILL.md", "# new")]);
        extract(&tarball, &target).unwrap();

        assert!(!target.join("stale.txt").exists());
        assert!(target.join("SKILL.md").exists());
    }
}
