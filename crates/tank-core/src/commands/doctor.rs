//! `tank doctor`: report detected agents, local/global/dev skill status,
//! and dangling link-manifest entries (§4.8).

use crate::agents::{detected_agents, AgentDescriptor};
use crate::context::Context;
use crate::link::{check_consistency, DanglingLink, LinkSource, LinksManifest};

pub struct DoctorReport {
    pub detected_agents: Vec<AgentDescriptor>,
    pub local_links: Vec<(String, LinkSource)>,
    pub global_links: Vec<(String, LinkSource)>,
    pub dangling: Vec<DanglingLink>,
}

pub fn run(ctx: &Context) -> anyhow::Result<DoctorReport> {
    let detected = detected_agents(&ctx.home);

    let local_manifest = LinksManifest::load(&ctx.links_manifest_path(false))?;
    let global_manifest = LinksManifest::load(&ctx.links_manifest_path(true))?;

    let local_links: Vec<(String, LinkSource)> = local_manifest
        .links
        .iter()
        .map(|(name, entry)| (name.clone(), entry.source))
        .collect();
    let global_links: Vec<(String, LinkSource)> = global_manifest
        .links
        .iter()
        .map(|(name, entry)| (name.clone(), entry.source))
        .collect();

    let mut dangling = check_consistency(&local_manifest, &ctx.agent_skills_root(false));
    dangling.extend(check_consistency(&global_manifest, &ctx.agent_skills_root(true)));

    Ok(DoctorReport {
        detected_agents: detected,
        local_links,
        global_links,
        dangling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn reports_no_findings_on_a_clean_project() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());

        let report = run(&ctx).unwrap();
        assert!(report.detected_agents.is_empty());
        assert!(report.local_links.is_empty());
        assert!(report.dangling.is_empty());
    }
}
