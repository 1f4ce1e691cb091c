//! Resolver (§4.3): pick the highest semver version satisfying a range.

use semver::{Version, VersionReq};

use crate::error::ResolverError;
use crate::registry::VersionEntry;

/// Resolve `range` against `versions`, returning the highest matching entry.
/// Ties (equal version) are broken by `published_at` descending.
///
/// Prereleases are excluded unless `range` explicitly names one — this is
/// exactly `semver::VersionReq::matches`'s own behavior (Open Question 2).
pub fn resolve<'a>(
    name: &str,
    range: &str,
    versions: &'a [VersionEntry],
) -> Result<&'a VersionEntry, ResolverError> {
    let req = if range == "*" {
        VersionReq::STAR
    } else {
        VersionReq::parse(range).map_err(|_| ResolverError::NoMatch {
            name: name.to_string(),
            range: range.to_string(),
        })?
    };

    let mut candidates: Vec<(&VersionEntry, Version)> = versions
        .iter()
        .filter_map(|entry| {
            let version = Version::parse(&entry.version).ok()?;
            req.matches(&version).then_some((entry, version))
        })
        .collect();

    candidates.sort_by(|(a_entry, a_ver), (b_entry, b_ver)| {
        a_ver
            .cmp(b_ver)
            .then_with(|| a_entry.published_at.cmp(&b_entry.published_at))
    });

    candidates
        .into_iter()
        .last()
        .map(|(entry, _)| entry)
        .ok_or_else(|| ResolverError::NoMatch {
            name: name.to_string(),
            range: range.to_string(),
        })
}
