use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("social.toml");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[store]"));
    assert!(content.contains("lenient_parsing = true"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("social.toml");
    fs::write(&config_path, "# mine").expect("write config");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_init_force_replaces_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("nested").join("social.toml");
    fs::create_dir_all(config_path.parent().unwrap()).expect("create dir");
    fs::write(&config_path, "# mine").expect("write config");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.args(["config", "init", "--force", "--path"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("social-scheduler doctor"));

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[browser]"));
}

#[test]
fn config_show_applies_env_overrides() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.current_dir(dir.path())
        .env("SOCIAL_SCHEDULER__STORE__COMMAND", "/opt/bin/dstask")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("command = \"/opt/bin/dstask\""));
}

#[test]
fn draft_with_memory_store() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.current_dir(dir.path())
        .args(["--store", "memory", "draft", "hello", "world", "-p", "twitter,bluesky"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created draft post for twitter, bluesky",
        ));
}

#[test]
fn draft_rejects_unknown_platform() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.current_dir(dir.path())
        .args(["--store", "memory", "draft", "hello", "-p", "myspace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --platforms"));
}

#[test]
fn tool_draft_without_content_fails() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    let output = cmd
        .current_dir(dir.path())
        .args(["--store", "memory", "tool", r#"{"action":"draft"}"#])
        .output()
        .expect("run tool");

    assert!(!output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["ok"], false);
    assert_eq!(value["error"], "Content is required for draft action");
}

#[test]
fn tool_unknown_action_fails() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.current_dir(dir.path())
        .args(["--store", "memory", "tool", r#"{"action":"boost"}"#])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown action: boost"));
}

#[test]
fn tool_reads_params_from_file() {
    let dir = TempDir::new().expect("temp dir");
    let params = dir.path().join("call.json");
    fs::write(&params, r#"{"action":"list"}"#).expect("write params");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.current_dir(dir.path())
        .args(["--store", "memory", "tool", "--file"])
        .arg(&params)
        .assert()
        .success()
        .stdout(predicate::str::contains("No posts found"));
}

#[test]
fn tool_schema_lists_actions() {
    let mut cmd = cargo_bin_cmd!("social-scheduler");
    let output = cmd.args(["tool", "--schema"]).output().expect("run tool");

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["name"], "social_scheduler");
}

#[test]
fn rpc_unknown_method_fails() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.current_dir(dir.path())
        .args(["--store", "memory", "rpc", "social.boost"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown method"));
}

#[test]
fn list_json_on_empty_memory_store() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    let output = cmd
        .current_dir(dir.path())
        .args(["--store", "memory", "list", "--json"])
        .output()
        .expect("run list");

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value, serde_json::json!([]));
}

#[test]
fn publish_missing_post_fails() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("social-scheduler");
    cmd.current_dir(dir.path())
        .args(["--store", "memory", "--dry-run", "publish", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Post 42 not found"));
}
