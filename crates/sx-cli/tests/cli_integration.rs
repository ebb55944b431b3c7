//! CLI integration tests
//!
//! Tests the synapse-exec CLI using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn synapse_exec() -> Command {
    let mut cmd = Command::cargo_bin("synapse-exec")
        .expect("Failed to locate synapse-exec binary - ensure it's built before running tests");
    cmd.env_remove("SYNAPSE_EXEC_URL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    synapse_exec()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synapse-exec"))
        .stdout(predicate::str::contains("execution service"));
}

#[test]
fn test_cli_version() {
    synapse_exec()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("synapse-exec"));
}

#[test]
fn test_cli_run_help() {
    synapse_exec()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stdin"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_cli_run_missing_script() {
    // Run requires a script argument
    synapse_exec().arg("run").assert().failure();
}

#[test]
fn test_cli_unknown_command() {
    synapse_exec()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_cli_blank_stdin_is_skipped() {
    // Nothing listens on port 1, so connecting would fail the run
    synapse_exec()
        .args(["run", "-", "--url", "ws://127.0.0.1:1/"])
        .write_stdin("   \n")
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to run"));
}

#[test]
fn test_cli_run_unreachable_service() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.lua");
    std::fs::write(&script, "print('hi')").unwrap();

    synapse_exec()
        .args(["run", "--json", "--url", "ws://127.0.0.1:1/"])
        .arg(&script)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""result":"connect_failed""#));
}

#[test]
fn test_cli_run_rejects_non_websocket_url() {
    synapse_exec()
        .args(["run", "-", "--url", "http://localhost:24892/"])
        .write_stdin("print(1)")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ws://"));
}

#[test]
fn test_cli_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    synapse_exec()
        .args(["config", "path", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_cli_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    synapse_exec()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    synapse_exec()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ws://localhost:24892/"));
}

#[test]
fn test_cli_missing_explicit_config() {
    let dir = tempfile::tempdir().unwrap();

    synapse_exec()
        .args(["run", "-", "--config"])
        .arg(dir.path().join("absent.toml"))
        .write_stdin("print(1)")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}
