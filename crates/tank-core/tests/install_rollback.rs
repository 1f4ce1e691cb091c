//! Registry-backed install tests: a stubbed in-process registry
//! (`wiremock`) drives `install_one`/`install_from_lockfile` through a
//! deliberate integrity mismatch and a deliberate multi-skill failure.
//! The first confirms a failed download never reaches extraction; the
//! second drives `rollback_skills_tree` itself and confirms it leaves
//! `.tank/skills/` entirely absent.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tank_core::commands::install::{install_from_lockfile, install_one};
use tank_core::context::Context;
use tank_core::integrity;
use tank_core::lockfile::{LockEntry, Lockfile};

fn version_entry_json(version: &str, integrity: &str) -> serde_json::Value {
    json!({
        "version": version,
        "integrity": integrity,
        "auditStatus": "completed",
        "publishedAt": "2024-01-01T00:00:00Z",
    })
}

fn version_detail_json(version: &str, integrity: &str, download_url: &str) -> serde_json::Value {
    let mut detail = version_entry_json(version, integrity);
    detail["downloadUrl"] = json!(download_url);
    detail["permissions"] = json!(null);
    detail
}

#[tokio::test]
async fn integrity_mismatch_leaves_no_trace_under_skills_root() {
    let registry = MockServer::start().await;

    let bogus_integrity = "sha512-doesnotmatchanything";
    let download_url = format!("{}/tarballs/demo-1.0.0.tgz", registry.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/skills/demo/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([version_entry_json("1.0.0", bogus_integrity)])))
        .mount(&registry)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/skills/demo/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_detail_json("1.0.0", bogus_integrity, &download_url)))
        .mount(&registry)
        .await;

    Mock::given(method("GET"))
        .and(path("/tarballs/demo-1.0.0.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"these are not the promised bytes".to_vec()))
        .mount(&registry)
        .await;

    let home = tempfile::TempDir::new().unwrap();
    let project = tempfile::TempDir::new().unwrap();
    let mut ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());
    ctx.registry = registry.uri();

    let err = install_one(&ctx, "demo", "*", false, &None).await;
    assert!(err.is_err());

    assert!(!ctx.skills_root(false).join("demo").exists());
    assert!(!ctx.skills_root(false).exists());

    let lockfile = Lockfile::load(&ctx.lockfile_path(false)).unwrap();
    assert!(lockfile.skills.is_empty());
}

#[tokio::test]
async fn multi_skill_lockfile_install_rolls_back_entire_skills_tree_on_failure() {
    let registry = MockServer::start().await;

    let good_bytes = b"a perfectly good tarball".to_vec();
    let good_integrity = integrity::compute(&good_bytes);
    let good_download_url = format!("{}/tarballs/good.tgz", registry.uri());

    let bad_integrity = "sha512-thisisnottherightdigest";
    let bad_download_url = format!("{}/tarballs/bad.tgz", registry.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/skills/demo-a/1.0.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(version_detail_json("1.0.0", &good_integrity, &good_download_url))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&registry)
        .await;

    Mock::given(method("GET"))
        .and(path("/tarballs/good.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(good_bytes))
        .mount(&registry)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/skills/demo-b/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_detail_json("1.0.0", bad_integrity, &bad_download_url)))
        .mount(&registry)
        .await;

    Mock::given(method("GET"))
        .and(path("/tarballs/bad.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes that won't verify".to_vec()))
        .mount(&registry)
        .await;

    let home = tempfile::TempDir::new().unwrap();
    let project = tempfile::TempDir::new().unwrap();
    let mut ctx = Context::for_test(home.path().to_path_buf(), project.path().to_path_buf(), Utc::now());
    ctx.registry = registry.uri();

    let mut lockfile = Lockfile::default();
    lockfile.insert(
        "demo-a",
        "1.0.0",
        LockEntry {
            resolved: "1.0.0".to_string(),
            integrity: good_integrity.clone(),
            permissions: None,
            audit_score: None,
        },
    );
    lockfile.insert(
        "demo-b",
        "1.0.0",
        LockEntry {
            resolved: "1.0.0".to_string(),
            integrity: bad_integrity.to_string(),
            permissions: None,
            audit_score: None,
        },
    );
    lockfile.save(&ctx.lockfile_path(false)).unwrap();

    let result = install_from_lockfile(&ctx, false).await;
    assert!(result.is_err());

    assert!(!ctx.skills_root(false).exists());
}
