//! Permission engine (§4.4): subset-check of a skill's requested
//! capabilities against a consuming project's budget.
//!
//! A budget slot being absent means "unspecified"; a skill slot being
//! absent means "does not request". Containment between two glob
//! patterns is approximated by three rules (Open Question 3): literal
//! equality, budget pattern `*` (matches everything), and one-directional
//! wildcard-anchored suffix containment (`*.example.com` covers
//! `foo.example.com` and `*.foo.example.com`, never the reverse).

use crate::error::PermissionViolation;
use crate::manifest::Permissions;

/// Check `requested` (a skill's declared permissions) against `budget`
/// (a project's permission budget). Returns non-fatal warnings on success,
/// or the first violation encountered.
pub fn check(
    requested: &Option<Permissions>,
    budget: &Option<Permissions>,
) -> Result<Vec<String>, PermissionViolation> {
    let Some(requested) = requested else {
        return Ok(Vec::new());
    };

    let Some(budget) = budget else {
        if requested.network.is_none()
            && requested.filesystem.is_none()
            && !requested.subprocess.unwrap_or(false)
        {
            return Ok(Vec::new());
        }
        return Ok(vec![
            "project has no permission budget; installing with unchecked permissions".to_string(),
        ]);
    };

    if let Some(network) = &requested.network {
        let allowed = budget
            .network
            .as_ref()
            .map(|n| n.outbound.as_slice())
            .unwrap_or(&[]);
        for pattern in &network.outbound {
            if !is_covered(pattern, allowed) {
                return Err(PermissionViolation::Violation {
                    slot: "network.outbound",
                    requested: network.outbound.clone(),
                    budget: allowed.to_vec(),
                });
            }
        }
    }

    if let Some(filesystem) = &requested.filesystem {
        let allowed_read = budget
            .filesystem
            .as_ref()
            .map(|f| f.read.as_slice())
            .unwrap_or(&[]);
        for pattern in &filesystem.read {
            if !is_covered(pattern, allowed_read) {
                return Err(PermissionViolation::Violation {
                    slot: "filesystem.read",
                    requested: filesystem.read.clone(),
                    budget: allowed_read.to_vec(),
                });
            }
        }

        let allowed_write = budget
            .filesystem
            .as_ref()
            .map(|f| f.write.as_slice())
            .unwrap_or(&[]);
        for pattern in &filesystem.write {
            if !is_covered(pattern, allowed_write) {
                return Err(PermissionViolation::Violation {
                    slot: "filesystem.write",
                    requested: filesystem.write.clone(),
                    budget: allowed_write.to_vec(),
                });
            }
        }
    }

    if requested.subprocess.unwrap_or(false) && !budget.subprocess.unwrap_or(false) {
        return Err(PermissionViolation::SubprocessDenied);
    }

    Ok(Vec::new())
}

/// Whether every concrete string matched by `pattern` is also matched by
/// some pattern in `budget`.
fn is_covered(pattern: &str, budget: &[String]) -> bool {
    budget.iter().any(|allowed| pattern_covered_by(pattern, allowed))
}

fn pattern_covered_by(pattern: &str, allowed: &str) -> bool {
    if pattern == allowed {
        return true;
    }
    if allowed == "*" {
        return true;
    }
    if let Some(suffix) = allowed.strip_prefix('*') {
        // allowed = "*<suffix>" covers pattern iff pattern ends with suffix,
        // or pattern is itself "*<deeper-suffix>" whose suffix still ends
        // with the budget's suffix.
        if let Some(pattern_suffix) = pattern.strip_prefix('*') {
            return pattern_suffix.ends_with(suffix);
        }
        return pattern.ends_with(suffix);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{FilesystemPermissions, NetworkPermissions};

    fn perms(network: Option<Vec<&str>>, subprocess: Option<bool>) -> Permissions {
        Permissions {
            network: network.map(|outbound| NetworkPermissions {
                outbound: outbound.into_iter().map(String::from).collect(),
            }),
            filesystem: None,
            subprocess,
        }
    }

    #[test]
    fn no_request_is_always_ok() {
        let warnings = check(&None, &None).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_budget_with_request_warns_but_succeeds() {
        let requested = Some(perms(Some(vec!["*.example.com"]), None));
        let warnings = check(&requested, &None).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn literal_equality_is_covered() {
        let requested = Some(perms(Some(vec!["api.example.com"]), None));
        let budget = Some(perms(Some(vec!["api.example.com"]), None));
        assert!(check(&requested, &budget).unwrap().is_empty());
    }

    #[test]
    fn wildcard_prefix_covers_subdomain() {
        let requested = Some(perms(Some(vec!["foo.example.com"]), None));
        let budget = Some(perms(Some(vec!["*.example.com"]), None));
        assert!(check(&requested, &budget).unwrap().is_empty());
    }

    #[test]
    fn wildcard_prefix_covers_nested_wildcard() {
        let requested = Some(perms(Some(vec!["*.foo.example.com"]), None));
        let budget = Some(perms(Some(vec!["*.example.com"]), None));
        assert!(check(&requested, &budget).unwrap().is_empty());
    }

    #[test]
    fn wildcard_does_not_cover_in_reverse() {
        let requested = Some(perms(Some(vec!["*.example.com"]), None));
        let budget = Some(perms(Some(vec!["foo.example.com"]), None));
        let err = check(&requested, &budget).unwrap_err();
        assert!(matches!(err, PermissionViolation::Violation { slot: "network.outbound", .. }));
    }

    #[test]
    fn uncovered_host_is_a_violation() {
        let requested = Some(perms(Some(vec!["evil.com"]), None));
        let budget = Some(perms(Some(vec!["*.example.com"]), None));
        let err = check(&requested, &budget).unwrap_err();
        assert!(matches!(err, PermissionViolation::Violation { .. }));
    }

    #[test]
    fn subprocess_requires_explicit_budget_true() {
        let requested = Some(perms(None, Some(true)));
        let err = check(&requested, &Some(perms(None, None))).unwrap_err();
        assert!(matches!(err, PermissionViolation::SubprocessDenied));

        let budget = Some(perms(None, Some(true)));
        assert!(check(&requested, &budget).unwrap().is_empty());
    }

    #[test]
    fn filesystem_read_write_checked_independently() {
        let requested = Some(Permissions {
            network: None,
            filesystem: Some(FilesystemPermissions {
                read: vec!["/tmp/**".to_string()],
                write: vec!["/tmp/out/**".to_string()],
            }),
            subprocess: None,
        });
        let budget = Some(Permissions {
            network: None,
            filesystem: Some(FilesystemPermissions {
                read: vec!["/tmp/**".to_string()],
                write: vec![],
            }),
            subprocess: None,
        });
        let err = check(&requested, &budget).unwrap_err();
        assert!(matches!(
            err,
            PermissionViolation::Violation {
                slot: "filesystem.write",
                ..
            }
        ));
    }
}
