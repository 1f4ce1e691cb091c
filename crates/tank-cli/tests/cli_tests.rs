//! End-to-end CLI tests driving the `tank` binary directly.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tank(home: &TempDir, project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tank").unwrap();
    cmd.env("HOME", home.path())
        .current_dir(project.path());
    cmd
}

#[test]
fn init_writes_starter_manifest() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    tank(&home, &project)
        .args(["init", "demo-skill", "a demo skill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skills.json"));

    let manifest = std::fs::read_to_string(project.path().join("skills.json")).unwrap();
    assert!(manifest.contains("\"demo-skill\""));
    assert!(manifest.contains("\"0.1.0\""));
}

#[test]
fn init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    tank(&home, &project).args(["init", "demo", "x"]).assert().success();
    tank(&home, &project).args(["init", "demo", "x"]).assert().failure();
}

#[test]
fn doctor_runs_clean_on_a_fresh_project() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    tank(&home, &project)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("dangling entries: 0"));
}

#[test]
fn verify_on_an_empty_project_reports_zero_skills() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    tank(&home, &project)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 skill(s) verified"));
}

#[test]
fn whoami_reports_logged_out_by_default() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    tank(&home, &project)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn login_then_whoami_reports_user() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    tank(&home, &project)
        .args(["login", "secret-token", "alice"])
        .assert()
        .success();

    tank(&home, &project)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"));
}

#[test]
fn dev_link_then_unlink_round_trips() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join(".claude")).unwrap();
    let project = TempDir::new().unwrap();

    tank(&home, &project)
        .args(["init", "demo", "a demo skill"])
        .assert()
        .success();
    std::fs::write(project.path().join("SKILL.md"), "# demo").unwrap();

    tank(&home, &project)
        .arg("link")
        .assert()
        .success()
        .stdout(predicate::str::contains("linked demo"));

    assert!(home.path().join(".claude/skills/demo").exists());

    tank(&home, &project)
        .args(["unlink", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unlinked demo"));

    assert!(!home.path().join(".claude/skills/demo").exists());
}
