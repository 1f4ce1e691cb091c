//! Skill manifest model (`skills.json`).
//!
//! Replaces dynamic JSON property access with a closed, tagged-variant
//! schema: parsed once at the boundary, typed errors on the way out. The
//! `permissions` field is always three independent optional slots, never a
//! property bag — see [`Permissions`].

use std::collections::BTreeMap;
use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A skill's name: either bare (`foo`) or scoped (`@scope/foo`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillName {
    Bare(String),
    Scoped { scope: String, name: String },
}

impl SkillName {
    /// Parse and validate a skill name, lowercasing both segments.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let lowered = raw.to_ascii_lowercase();
        if let Some(rest) = lowered.strip_prefix('@') {
            let (scope, name) = rest
                .split_once('/')
                .ok_or_else(|| ValidationError::InvalidName(raw.to_string()))?;
            if !is_valid_segment(scope) || !is_valid_segment(name) {
                return Err(ValidationError::InvalidName(raw.to_string()));
            }
            Ok(SkillName::Scoped {
                scope: scope.to_string(),
                name: name.to_string(),
            })
        } else {
            if !is_valid_segment(&lowered) {
                return Err(ValidationError::InvalidName(raw.to_string()));
            }
            Ok(SkillName::Bare(lowered))
        }
    }

    /// Filesystem-safe flat rendering: `@scope/name` -> `scope--name`, bare passes through.
    pub fn flat_name(&self) -> String {
        match self {
            SkillName::Bare(name) => name.clone(),
            SkillName::Scoped { scope, name } => format!("{scope}--{name}"),
        }
    }

    /// Directory-safe form for the extraction tree: `@scope/name` -> `@scope/name`.
    pub fn extract_subpath(&self) -> String {
        self.to_string()
    }
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
        return false;
    }
    segment
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillName::Bare(name) => write!(f, "{name}"),
            SkillName::Scoped { scope, name } => write!(f, "@{scope}/{name}"),
        }
    }
}

impl Serialize for SkillName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SkillName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        SkillName::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Host/path glob permission slots requested by a skill, or allowed by a
/// project budget. The same shape serves both roles; see §4.4 for how
/// slot-absence is interpreted differently in each role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkPermissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<FilesystemPermissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subprocess: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkPermissions {
    #[serde(default)]
    pub outbound: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilesystemPermissions {
    #[serde(default)]
    pub read: Vec<String>,
    #[serde(default)]
    pub write: Vec<String>,
}

/// `skills.json` — a skill's own manifest, or a consumer project's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillManifest {
    pub name: SkillName,
    #[serde(with = "version_serde")]
    pub version: Version,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// Dependency name -> version range. Present only in consumer projects.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skills: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

mod version_serde {
    use semver::Version;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(version: &Version, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&version.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Version, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

const KNOWN_TOP_LEVEL_FIELDS: &[&str] = &[
    "name",
    "version",
    "description",
    "repository_url",
    "skills",
    "permissions",
];

impl SkillManifest {
    /// Parse `skills.json` bytes for installation purposes: tolerant of
    /// unknown future fields.
    pub fn parse(bytes: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(bytes).map_err(ValidationError::NotJson)
    }

    /// Parse for `publish`: rejects extraneous top-level fields, per §3's
    /// "extraneous top-level fields rejected on publish".
    pub fn parse_for_publish(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(ValidationError::NotJson)?;
        if let serde_json::Value::Object(map) = &value {
            let extraneous: Vec<String> = map
                .keys()
                .filter(|key| !KNOWN_TOP_LEVEL_FIELDS.contains(&key.as_str()))
                .cloned()
                .collect();
            if !extraneous.is_empty() {
                return Err(ValidationError::ExtraneousFields(extraneous));
            }
        }
        serde_json::from_value(value).map_err(ValidationError::NotJson)
    }

    pub fn to_bytes_pretty(&self) -> Vec<u8> {
        let mut bytes = serde_json::to_vec_pretty(self).expect("SkillManifest always serializes");
        bytes.push(b'\n');
        bytes
    }
}
