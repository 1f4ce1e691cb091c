//! Wire types for the registry's REST contract (§4.2, §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::Permissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStatus {
    Pending,
    Completed,
    Published,
    Flagged,
    Failed,
    ScanFailed,
}

/// A single version listing entry, as returned by `listVersions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    pub integrity: String,
    #[serde(default, rename = "auditScore")]
    pub audit_score: Option<f64>,
    #[serde(rename = "auditStatus")]
    pub audit_status: AuditStatus,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
}

/// Full version metadata, as returned by `getVersion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDetail {
    #[serde(flatten)]
    pub entry: VersionEntry,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishInitRequest<'a> {
    pub manifest: &'a crate::manifest::SkillManifest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishInitResponse {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    #[serde(rename = "skillId")]
    pub skill_id: String,
    #[serde(rename = "versionId")]
    pub version_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishConfirmRequest {
    #[serde(rename = "versionId")]
    pub version_id: String,
    pub integrity: String,
    #[serde(rename = "fileCount")]
    pub file_count: usize,
    #[serde(rename = "tarballSize")]
    pub tarball_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishConfirmResponse {
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub description: String,
    #[serde(rename = "latestVersion")]
    pub latest_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "latestVersion")]
    pub latest_version: String,
}
