// ABOUTME: Integration tests for the stackline CLI commands.
// ABOUTME: Validates --help output, init, plan, deploy and facts against a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn stackline_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("stackline"))
}

#[test]
fn help_shows_commands() {
    stackline_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("facts"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("stackline.yml");

    stackline_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--app", "flows", "-e", "dev"])
        .assert()
        .success();

    assert!(config_path.exists(), "stackline.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("app: flows"));
    assert!(content.contains("environment: dev"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("stackline.yml"), "app: n8n").unwrap();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn plan_without_environment_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("stackline.yml"), "app: n8n").unwrap();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no environment selected"));
}

#[test]
fn plan_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .args(["plan", "-e", "stg"])
        .assert()
        .failure();
}

#[test]
fn plan_lists_units_in_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("stackline.yml"), "app: n8n").unwrap();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .args(["plan", "-e", "stg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. network (N8nStgNetworkStack)"))
        .stdout(predicate::str::contains("application"))
        .stdout(predicate::str::contains("/n8n/stg/Vpc/Id"));
}

#[test]
fn plan_json_emits_plan_event() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("stackline.yml"), "app: n8n").unwrap();

    let assert = stackline_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "plan", "-e", "stg", "--bastion"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let plan = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .find(|event| event["event"] == "plan")
        .expect("plan event");
    let units: Vec<&str> = plan["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["unit"].as_str().unwrap())
        .collect();
    assert!(units.contains(&"bastion"));
    assert!(!units.contains(&"managed-database"));
    assert_eq!(units.last(), Some(&"application"));
}

#[test]
fn deploy_then_list_facts() {
    let temp_dir = tempfile::tempdir().unwrap();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "-e", "stg"])
        .assert()
        .success();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .arg("deploy")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployed 6 unit(s)"));

    stackline_cmd()
        .current_dir(temp_dir.path())
        .arg("facts")
        .assert()
        .success()
        .stdout(predicate::str::contains("/n8n/stg/Vpc/Id"))
        .stdout(predicate::str::contains("/n8n/stg/Redis/Port"));
}

#[test]
fn deploy_only_without_upstream_facts_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("stackline.yml"), "app: n8n").unwrap();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "-e", "stg", "--only", "cache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fact not found"));
}

#[test]
fn facts_on_empty_namespace_succeeds() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("stackline.yml"), "app: n8n").unwrap();

    stackline_cmd()
        .current_dir(temp_dir.path())
        .args(["facts", "-e", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No facts published under /n8n/prod/"));
}
