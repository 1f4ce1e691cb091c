//! `tank audit`: fetch current audit metadata for every lockfile entry,
//! bounded to 8 concurrent requests (§5).

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::context::Context;
use crate::error::AuditVerdictError;
use crate::lockfile::Lockfile;
use crate::registry::{AuditStatus, RegistryClient};

const MAX_CONCURRENT_AUDITS: usize = 8;

#[derive(Debug, Clone)]
pub struct AuditFinding {
    pub key: String,
    pub audit_status: AuditStatus,
    pub audit_score: Option<f64>,
}

pub async fn run(ctx: &Context, global: bool) -> anyhow::Result<Vec<AuditFinding>> {
    let lockfile = Lockfile::load(&ctx.lockfile_path(global))?;
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_AUDITS));
    let registry = ctx.registry.clone();
    let token = ctx.token.clone();

    let mut tasks = FuturesUnordered::new();
    for key in lockfile.skills.keys().cloned() {
        let semaphore = semaphore.clone();
        let registry = registry.clone();
        let token = token.clone();
        tasks.push(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            let (name, version) = key
                .rsplit_once('@')
                .ok_or_else(|| anyhow::anyhow!("malformed lockfile key {key}"))?;
            let client = RegistryClient::new(registry, token);
            let detail = client.get_version(name, version).await?;
            anyhow::Ok(AuditFinding {
                key: key.clone(),
                audit_status: detail.entry.audit_status,
                audit_score: detail.entry.audit_score,
            })
        });
    }

    let mut findings = Vec::new();
    while let Some(result) = tasks.next().await {
        findings.push(result?);
    }
    findings.sort_by(|a, b| a.key.cmp(&b.key));

    check_verdict(&findings)?;
    Ok(findings)
}

/// Whether `status` reflects a failing audit verdict (§7: "`audit` may
/// exit non-zero when the verdict is negative even though no exception
/// occurred").
fn is_negative_verdict(status: AuditStatus) -> bool {
    matches!(status, AuditStatus::Flagged | AuditStatus::Failed | AuditStatus::ScanFailed)
}

/// Fail the command if any finding carries a negative verdict. Split out
/// from `run` so the verdict logic is testable without a registry.
fn check_verdict(findings: &[AuditFinding]) -> Result<(), AuditVerdictError> {
    let negative: Vec<String> = findings
        .iter()
        .filter(|finding| is_negative_verdict(finding.audit_status))
        .map(|finding| finding.key.clone())
        .collect();
    if negative.is_empty() {
        Ok(())
    } else {
        Err(AuditVerdictError::NegativeVerdict(negative))
    }
}
