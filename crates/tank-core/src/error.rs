//! Typed error taxonomy for the Tank client core.
//!
//! Each variant carries a human message plus whatever structured cause is
//! useful to the orchestrator. Library code returns these typed errors;
//! `main.rs` is the only place that renders them and picks an exit code.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid skill name '{0}': must be lowercase '[a-z0-9][a-z0-9-]*' or '@scope/name'")]
    InvalidName(String),
    #[error("invalid version '{0}': {1}")]
    InvalidVersion(String, semver::Error),
    #[error("manifest is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("manifest carries extraneous field(s) not allowed on publish: {0:?}")]
    ExtraneousFields(Vec<String>),
    #[error("manifest is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("directory does not exist: {0}")]
    DirMissing(PathBuf),
    #[error("required file missing: {0}")]
    MissingRequired(&'static str),
    #[error("skills.json is invalid: {0}")]
    InvalidManifest(#[source] ValidationError),
    #[error("symlink present at {0}: skill directories may not contain symlinks")]
    SymlinkPresent(PathBuf),
    #[error("path escapes packing root: {0}")]
    PathTraversal(PathBuf),
    #[error("too many files: {count} exceeds the limit of {limit}")]
    TooManyFiles { count: usize, limit: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("not authorized (401): {0}")]
    Unauthorized(String),
    #[error("forbidden (403): {0}")]
    Forbidden(String),
    #[error("not found (404): {0}")]
    NotFound(String),
    #[error("version already exists (409): bump the version and try again")]
    VersionExists,
    #[error("conflict (409): {0}")]
    Conflict(String),
    #[error("registry server error ({status}): {body}")]
    Server { status: u16, body: String },
    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("no version of '{name}' satisfies range '{range}'")]
    NoMatch { name: String, range: String },
}

#[derive(Debug, Error)]
pub enum AuditVerdictError {
    #[error("audit verdict negative for {0:?}: flagged, failed, or scan-failed")]
    NegativeVerdict(Vec<String>),
}

#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("integrity mismatch for {name}: expected {expected}, got {actual}")]
    Mismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Error)]
pub enum PermissionViolation {
    #[error("permission violation in '{slot}': skill requests {requested:?}, project budget allows {budget:?}")]
    Violation {
        slot: &'static str,
        requested: Vec<String>,
        budget: Vec<String>,
    },
    #[error("permission violation in 'subprocess': skill requires subprocess access, project budget denies it")]
    SubprocessDenied,
}

#[derive(Debug, Error)]
pub enum LockfileError {
    #[error("malformed lockfile {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported lockfile version {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to create symlink {link} -> {target}: {source}")]
    CreateSymlink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("wrapper directory missing for '{0}'")]
    WrapperMissing(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("archive entry escapes target root: {0}")]
    PathTraversal(PathBuf),
    #[error("archive entry is a symbolic link: {0}")]
    SymlinkEntry(PathBuf),
    #[error("archive entry uses an absolute path: {0}")]
    AbsolutePath(PathBuf),
    #[error("archive entry is not a regular file or directory: {0}")]
    UnsupportedEntryType(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Top-level error union used by the command orchestrator.
///
/// Mirrors §7's taxonomy as a single enum so `main.rs` can match once to
/// pick an exit code and a leading human message, while individual
/// subsystems keep their own narrow error types internally.
#[derive(Debug, Error)]
pub enum TankError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error(transparent)]
    Permission(#[from] PermissionViolation),
    #[error(transparent)]
    Lockfile(#[from] LockfileError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    AuditVerdict(#[from] AuditVerdictError),
    #[error("{0}")]
    Other(String),
}

impl TankError {
    /// Exit code a CLI frontend should use for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            TankError::Registry(RegistryError::VersionExists) => 10,
            TankError::Permission(_) => 11,
            TankError::Integrity(_) => 12,
            TankError::Pack(_) => 13,
            TankError::Extract(_) => 14,
            TankError::Network(_) | TankError::Registry(RegistryError::Network(_)) => 15,
            TankError::AuditVerdict(_) => 16,
            _ => 1,
        }
    }
}
