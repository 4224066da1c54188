//! CLI tests - no network I/O and no server is started.
//!
//! `--list-providers` resolves the configuration and exits, so these tests
//! exercise config discovery and env overrides end to end.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("photogen");
    cmd.env("PHOTOGEN_CONFIG", "/nonexistent/photogen.toml")
        .env_remove("OPENAI_API_KEY")
        .env_remove("STABILITY_API_KEY")
        .env_remove("BYPASS_OPENAI")
        .env_remove("BYPASS_STABILITY")
        .env_remove("PORT")
        .env_remove("PHOTOGEN_REPLAY")
        .env_remove("PHOTOGEN_REC");
    cmd
}

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn list_providers_without_keys() {
    cmd()
        .arg("--list-providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("openai\tpriority=0\tmissing key"))
        .stdout(predicate::str::contains("stability\tpriority=1\tmissing key"));
}

#[test]
fn env_keys_and_bypass_are_reflected() {
    cmd()
        .env("OPENAI_API_KEY", "sk-test")
        .env("STABILITY_API_KEY", "sk-test")
        .env("BYPASS_STABILITY", "true")
        .arg("--list-providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("openai\tpriority=0\tactive"))
        .stdout(predicate::str::contains("stability\tpriority=1\tbypassed"));
}

#[test]
fn config_file_priority_reorders_plan() {
    let path = temp_config(
        "photogen_cli_priority_test",
        r#"
[keys]
stability = "sk-file"

[providers.stability]
priority = 0

[providers.openai]
priority = 5
"#,
    );

    let output =
        cmd().args(["--config", path.to_str().unwrap(), "--list-providers"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, ["stability\tpriority=0\tactive", "openai\tpriority=5\tmissing key"]);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn malformed_config_exits_with_error() {
    let path = temp_config("photogen_cli_malformed_test", "[server\nport = ");

    cmd()
        .args(["--config", path.to_str().unwrap(), "--list-providers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn invalid_port_env_exits_with_error() {
    cmd()
        .env("PORT", "not-a-port")
        .arg("--list-providers")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid PORT"));
}

#[test]
fn out_of_range_strength_exits_with_error() {
    let path = temp_config("photogen_cli_strength_test", "[providers.stability]\nstrength = 1.5\n");

    cmd()
        .args(["--config", path.to_str().unwrap(), "--list-providers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("providers.stability"));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
