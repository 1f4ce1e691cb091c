//! Packer (§4.1): deterministic, safety-checked skill tarball creation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::PackError;
use crate::ignore::IgnoreSet;
use crate::manifest::SkillManifest;

const MAX_FILES: usize = 1000;

#[derive(Debug)]
pub struct PackOutput {
    pub tarball: Vec<u8>,
    pub integrity: String,
    pub file_count: usize,
    pub total_size: u64,
}

/// Pack `dir` into a gzip tarball, per §4.1.
pub fn pack(dir: &Path) -> Result<PackOutput, PackError> {
    if !dir.is_dir() {
        return Err(PackError::DirMissing(dir.to_path_buf()));
    }

    let manifest_path = dir.join("skills.json");
    let skill_md_path = dir.join("SKILL.md");
    if !manifest_path.is_file() {
        return Err(PackError::MissingRequired("skills.json"));
    }
    if !skill_md_path.is_file() {
        return Err(PackError::MissingRequired("SKILL.md"));
    }

    let manifest_bytes = fs::read(&manifest_path)?;
    SkillManifest::parse(&manifest_bytes).map_err(PackError::InvalidManifest)?;

    let ignores = IgnoreSet::resolve(dir).map_err(|e| PackError::Io(to_io_error(e)))?;

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    collect_files(dir, dir, &ignores, &mut files)?;

    if files.len() > MAX_FILES {
        return Err(PackError::TooManyFiles {
            count: files.len(),
            limit: MAX_FILES,
        });
    }

    files.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut total_size: u64 = 0;
    let mut tar_bytes = Vec::new();
    {
        let mut builder = tar::Builder::new(&mut tar_bytes);
        builder.mode(tar::HeaderMode::Deterministic);
        for (relative_path, absolute_path) in &files {
            let contents = fs::read(absolute_path)?;
            total_size += contents.len() as u64;

            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_uid(0);
            header.set_gid(0);
            header.set_mtime(0);
            header.set_cksum();
            builder.append_data(&mut header, relative_path, contents.as_slice())?;
        }
        builder.finish()?;
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_bytes)?;
    let gzipped = encoder.finish()?;

    let integrity = crate::integrity::compute(&gzipped);

    Ok(PackOutput {
        tarball: gzipped,
        integrity,
        file_count: files.len(),
        total_size,
    })
}

fn collect_files(
    root: &Path,
    dir: &Path,
    ignores: &IgnoreSet,
    out: &mut Vec<(String, PathBuf)>,
) -> Result<(), PackError> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let metadata = fs::symlink_metadata(&path)?;
        if metadata.is_symlink() {
            return Err(PackError::SymlinkPresent(path));
        }

        let relative = path
            .strip_prefix(root)
            .expect("walk never leaves root")
            .to_string_lossy()
            .replace('\\', "/");

        if relative.split('/').any(|component| component == "..") {
            return Err(PackError::PathTraversal(path));
        }

        if metadata.is_dir() {
            if ignores.is_ignored(&format!("{relative}/")) || ignores.is_ignored(&relative) {
                continue;
            }
            collect_files(root, &path, ignores, out)?;
        } else if metadata.is_file() {
            if ignores.is_ignored(&relative) {
                continue;
            }
            out.push((relative, path));
        }
    }

    Ok(())
}

fn to_io_error(err: anyhow::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
