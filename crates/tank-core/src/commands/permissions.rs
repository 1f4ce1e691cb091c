//! `tank permissions`: union of every installed skill's declared
//! permission requests (read-only report, distinct from the permission
//! engine's subset check in [`crate::permissions`]).

use std::collections::BTreeSet;

use crate::context::Context;
use crate::lockfile::Lockfile;
use crate::manifest::{FilesystemPermissions, NetworkPermissions, Permissions};

pub fn run(ctx: &Context, global: bool) -> anyhow::Result<Permissions> {
    let lockfile = Lockfile::load(&ctx.lockfile_path(global))?;

    let mut outbound = BTreeSet::new();
    let mut read = BTreeSet::new();
    let mut write = BTreeSet::new();
    let mut subprocess = false;

    for entry in lockfile.skills.values() {
        let Some(permissions) = &entry.permissions else {
            continue;
        };
        if let Some(network) = &permissions.network {
            outbound.extend(network.outbound.iter().cloned());
        }
        if let Some(filesystem) = &permissions.filesystem {
            read.extend(filesystem.read.iter().cloned());
            write.extend(filesystem.write.iter().cloned());
        }
        subprocess |= permissions.subprocess.unwrap_or(false);
    }

    Ok(Permissions {
        network: (!outbound.is_empty()).then(|| NetworkPermissions {
            outbound: outbound.into_iter().collect(),
        }),
        filesystem: (!read.is_empty() || !write.is_empty()).then(|| FilesystemPermissions {
            read: read.into_iter().collect(),
            write: write.into_iter().collect(),
        }),
        subprocess: subprocess.then_some(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::LockEntry;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn unions_permissions_across_installed_skills() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());

        let mut lockfile = Lockfile::load(&ctx.lockfile_path(false)).unwrap();
        lockfile.insert(
            "a",
            "1.0.0",
            LockEntry {
                resolved: "1.0.0".to_string(),
                integrity: "sha512-a".to_string(),
                permissions: Some(Permissions {
                    network: Some(NetworkPermissions {
                        outbound: vec!["*.a.com".to_string()],
                    }),
                    filesystem: None,
                    subprocess: None,
                }),
                audit_score: None,
            },
        );
        lockfile.insert(
            "b",
            "1.0.0",
            LockEntry {
                resolved: "1.0.0".to_string(),
                integrity: "sha512-b".to_string(),
                permissions: Some(Permissions {
                    network: None,
                    filesystem: None,
                    subprocess: Some(true),
                }),
                audit_score: None,
            },
        );
        lockfile.save(&ctx.lockfile_path(false)).unwrap();

        let union = run(&ctx, false).unwrap();
        assert_eq!(union.network.unwrap().outbound, vec!["*.a.com".to_string()]);
        assert_eq!(union.subprocess, Some(true));
    }
}
