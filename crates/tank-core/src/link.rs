//! Link manager (§4.7): wrapper directories + agent symlink fan-out.
//!
//! A skill becomes visible to a host agent through a two-hop path:
//! `<agent.skillsDir>/<flat-name>` (a symlink) -> `<wrapper dir>` (real
//! content or itself a symlink to the extracted skill tree). Tank always
//! links; it never copies or hardlinks.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{detected_agents, AgentDescriptor};
use crate::error::LinkError;
use crate::manifest::SkillName;

const LINKS_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSource {
    Local,
    Global,
    Dev,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkEntry {
    pub source: LinkSource,
    #[serde(rename = "sourceDir")]
    pub source_dir: PathBuf,
    #[serde(rename = "installedAt")]
    pub installed_at: DateTime<Utc>,
    #[serde(rename = "agentLinks")]
    pub agent_links: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinksManifest {
    pub version: u32,
    pub links: BTreeMap<String, LinkEntry>,
}

impl Default for LinksManifest {
    fn default() -> Self {
        Self {
            version: LINKS_MANIFEST_VERSION,
            links: BTreeMap::new(),
        }
    }
}

impl LinksManifest {
    pub fn load(path: &Path) -> Result<Self, LinkError> {
        match fs::read(path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| {
                    LinkError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, source))
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(LinkError::Io(err)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), LinkError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut bytes = serde_json::to_vec_pretty(self).expect("LinksManifest always serializes");
        bytes.push(b'\n');
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Create the wrapper directory and every agent symlink for `skill_name`,
/// then upsert the `links.json` entry. `skill_source_dir` is the real
/// on-disk content (extracted skill tree, or the dev working directory).
pub fn link(
    manifest: &mut LinksManifest,
    skill_name: &SkillName,
    version: &str,
    source: LinkSource,
    skill_source_dir: &Path,
    wrapper_root: &Path,
    home: &Path,
    now: DateTime<Utc>,
) -> Result<(), LinkError> {
    let flat_name = skill_name.flat_name();
    let wrapper_dir = wrapper_root.join(&flat_name);

    create_wrapper(&wrapper_dir, skill_name, version, skill_source_dir, source)?;

    let mut agent_links = BTreeMap::new();
    for descriptor in detected_agents(home) {
        let link_path = create_agent_symlink(&descriptor, &flat_name, &wrapper_dir)?;
        agent_links.insert(descriptor.id.key().to_string(), link_path);
    }

    manifest.links.insert(
        skill_name.to_string(),
        LinkEntry {
            source,
            source_dir: skill_source_dir.to_path_buf(),
            installed_at: now,
            agent_links,
        },
    );

    Ok(())
}

/// Remove every agent symlink for `skill_name`, its wrapper, and its
/// `links.json` entry. Broken symlinks are counted but do not abort the
/// operation; `sourceDir` is never touched. Returns the number of
/// already-broken/missing symlinks encountered.
pub fn unlink(
    manifest: &mut LinksManifest,
    skill_name: &str,
    wrapper_root: &Path,
) -> Result<usize, LinkError> {
    let Some(entry) = manifest.links.remove(skill_name) else {
        return Ok(0);
    };

    let mut broken = 0;
    for link_path in entry.agent_links.values() {
        match fs::symlink_metadata(link_path) {
            Ok(_) => {
                if let Err(err) = remove_symlink(link_path) {
                    tracing::warn!(path = %link_path.display(), error = %err, "failed to remove agent symlink");
                    broken += 1;
                }
            }
            Err(_) => broken += 1,
        }
    }

    let flat_name = SkillName::parse(skill_name)
        .map(|n| n.flat_name())
        .unwrap_or_else(|_| skill_name.to_string());
    remove_wrapper(wrapper_root, &flat_name)?;

    Ok(broken)
}

/// Remove a wrapper directory for `flat_name` under `wrapper_root`, if present.
pub fn remove_wrapper(wrapper_root: &Path, flat_name: &str) -> Result<(), LinkError> {
    let wrapper_dir = wrapper_root.join(flat_name);
    if wrapper_dir.exists() || fs::symlink_metadata(&wrapper_dir).is_ok() {
        if wrapper_dir.is_dir() && fs::symlink_metadata(&wrapper_dir)?.file_type().is_symlink() {
            remove_symlink(&wrapper_dir)?;
        } else if wrapper_dir.is_dir() {
            fs::remove_dir_all(&wrapper_dir)?;
        } else {
            fs::remove_file(&wrapper_dir)?;
        }
    }
    Ok(())
}

fn create_wrapper(
    wrapper_dir: &Path,
    skill_name: &SkillName,
    version: &str,
    skill_source_dir: &Path,
    source: LinkSource,
) -> Result<(), LinkError> {
    if let Some(parent) = wrapper_dir.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::symlink_metadata(wrapper_dir).is_ok() {
        remove_symlink_or_dir(wrapper_dir)?;
    }

    match source {
        LinkSource::Dev => {
            // Dev links get a real wrapper directory containing a stub
            // SKILL.md stamped with YAML frontmatter, plus a symlink back
            // to the real source.
            fs::create_dir_all(wrapper_dir)?;
            let skill_md = skill_source_dir.join("SKILL.md");
            let body = if skill_md.is_file() {
                fs::read_to_string(&skill_md).unwrap_or_default()
            } else {
                format!("# {skill_name}\n")
            };
            let stub = format!("---\nname: {skill_name}\nversion: {version}\n---\n{body}");
            fs::write(wrapper_dir.join("SKILL.md"), stub)?;
            symlink(skill_source_dir, &wrapper_dir.join("source"))?;

            // Record the source tree's content hash so `doctor` can flag
            // dev links whose working directory has drifted since linking.
            if let Ok(hash) = tree_hash(skill_source_dir) {
                fs::write(wrapper_dir.join(".source-hash"), hash)?;
            }
        }
        LinkSource::Local | LinkSource::Global => {
            symlink(skill_source_dir, wrapper_dir)?;
        }
    }

    Ok(())
}

fn create_agent_symlink(
    descriptor: &AgentDescriptor,
    flat_name: &str,
    wrapper_dir: &Path,
) -> Result<PathBuf, LinkError> {
    fs::create_dir_all(&descriptor.skills_dir)?;
    let link_path = descriptor.skills_dir.join(flat_name);
    if fs::symlink_metadata(&link_path).is_ok() {
        remove_symlink_or_dir(&link_path)?;
    }
    symlink(wrapper_dir, &link_path)?;
    Ok(link_path)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> Result<(), LinkError> {
    std::os::unix::fs::symlink(target, link).map_err(|source| LinkError::CreateSymlink {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> Result<(), LinkError> {
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    result.map_err(|source| LinkError::CreateSymlink {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

fn remove_symlink_or_dir(path: &Path) -> Result<(), LinkError> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        remove_symlink(path)?;
    } else if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// A single dangling-link finding for `doctor` (§4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    pub skill_name: String,
    pub agent: String,
    pub path: PathBuf,
    pub reason: &'static str,
}

/// Deterministic blake3 hash of a directory tree's contents: every regular
/// file, sorted by relative path, hashed as `<relative path>\0<bytes>`.
/// Used for drift detection, not integrity verification against a
/// known-good digest — the content itself is the baseline.
fn tree_hash(dir: &Path) -> std::io::Result<String> {
    let mut paths = Vec::new();
    collect_files(dir, dir, &mut paths)?;
    paths.sort();

    let mut hasher = blake3::Hasher::new();
    for relative in &paths {
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hasher.update(&fs::read(dir.join(relative))?);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            continue;
        } else if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            out.push(path.strip_prefix(root).expect("child of root").to_path_buf());
        }
    }
    Ok(())
}

/// Check every `links.json` entry for a broken invariant: a listed symlink
/// that doesn't exist, or doesn't resolve through to the wrapper; for dev
/// links, also flag a source tree that has changed since linking.
pub fn check_consistency(manifest: &LinksManifest, wrapper_root: &Path) -> Vec<DanglingLink> {
    let mut findings = Vec::new();
    for (skill_name, entry) in &manifest.links {
        for (agent, link_path) in &entry.agent_links {
            match fs::symlink_metadata(link_path) {
                Err(_) => findings.push(DanglingLink {
                    skill_name: skill_name.clone(),
                    agent: agent.clone(),
                    path: link_path.clone(),
                    reason: "symlink missing",
                }),
                Ok(metadata) if !metadata.file_type().is_symlink() => {
                    findings.push(DanglingLink {
                        skill_name: skill_name.clone(),
                        agent: agent.clone(),
                        path: link_path.clone(),
                        reason: "not a symlink",
                    })
                }
                Ok(_) => {
                    if fs::canonicalize(link_path).is_err() {
                        findings.push(DanglingLink {
                            skill_name: skill_name.clone(),
                            agent: agent.clone(),
                            path: link_path.clone(),
                            reason: "symlink does not resolve",
                        });
                    }
                }
            }
        }

        let flat_name = SkillName::parse(skill_name)
            .map(|n| n.flat_name())
            .unwrap_or_else(|_| skill_name.clone());
        let wrapper_dir = wrapper_root.join(&flat_name);
        if fs::symlink_metadata(&wrapper_dir).is_err() {
            findings.push(DanglingLink {
                skill_name: skill_name.clone(),
                agent: "*".to_string(),
                path: wrapper_dir.clone(),
                reason: "wrapper missing",
            });
        } else if entry.source == LinkSource::Dev {
            let recorded = fs::read_to_string(wrapper_dir.join(".source-hash")).ok();
            let current = tree_hash(&entry.source_dir).ok();
            if let (Some(recorded), Some(current)) = (recorded, current) {
                if recorded != current {
                    findings.push(DanglingLink {
                        skill_name: skill_name.clone(),
                        agent: "*".to_string(),
                        path: entry.source_dir.clone(),
                        reason: "dev source changed since link",
                    });
                }
            }
        }
    }
    findings
}
