use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `firedocs` command isolated from the user's home and working directory
fn firedocs(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("firedocs").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("FIREDOCS_SERVICE_ACCOUNT_KEY")
        .env_remove("FIREDOCS_CLIENT_SECRET");
    cmd
}

#[test]
fn test_no_subcommand_prints_help() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_tools_lists_every_tool() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("create_user"))
        .stdout(predicate::str::contains("firestore_list_collections"))
        .stdout(predicate::str::contains("create_document"));
}

#[test]
fn test_offline_call_prints_success_envelope() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .args([
            "--offline",
            "call",
            "set_data",
            "--args",
            r#"{"path": "/users/123/", "data": {"name": "Ana"}}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success": true"#))
        .stdout(predicate::str::contains(r#""path": "users/123""#));
}

#[test]
fn test_failed_tool_call_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .args(["--offline", "call", "get_user", "--args", r#"{"uid": "nobody"}"#])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""success": false"#));
}

#[test]
fn test_unknown_tool_is_a_failure_envelope() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .args(["--offline", "call", "drop_database"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unknown tool: drop_database"));
}

#[test]
fn test_non_object_arguments_are_rejected() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .args(["--offline", "call", "get_data", "--args", "[1, 2]"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("JSON object"));
}

#[test]
fn test_missing_key_files_are_a_configuration_failure() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .args(["call", "list_users"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("service_account_key"));
}

#[test]
fn test_missing_explicit_config_file_is_a_configuration_failure() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .args(["--config", "nowhere.yaml", "call", "list_users"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_broken_discovered_config_is_skipped() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("firedocs.yaml"), "http_timeout_secs: [oops").unwrap();
    firedocs(&dir)
        .args(["call", "list_users"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("service_account_key"));
}

#[test]
fn test_login_refuses_offline() {
    let dir = TempDir::new().unwrap();
    firedocs(&dir)
        .args(["--offline", "login"])
        .assert()
        .code(2);
}
