//! Integration tests for the `dnsdeck` CLI binary.
//!
//! Argument parsing, completions, and error handling run without a
//! server. The session flow runs against a wiremock management API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `dnsdeck` binary with env isolation.
///
/// Clears all `DNSDECK_*` env vars and points config and data
/// directories at `home` so tests never touch the user's real files.
fn dnsdeck_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dnsdeck");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("DNSDECK_PROFILE")
        .env_remove("DNSDECK_API_URL")
        .env_remove("DNSDECK_OUTPUT")
        .env_remove("DNSDECK_INSECURE")
        .env_remove("DNSDECK_TIMEOUT")
        .env_remove("DNSDECK_USERNAME")
        .env_remove("DNSDECK_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = dnsdeck_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("DNS management")
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("zones")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dnsdeck"));
}

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .arg("records")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef dnsdeck"));
}

#[test]
fn test_completions_fish() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -c dnsdeck"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_points_into_config_home() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_profiles_empty() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["--profile", "staging", "whoami"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Profile 'staging' not found"));
}

// ── Session errors ──────────────────────────────────────────────────

#[test]
fn test_whoami_without_session() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .arg("whoami")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_zones_without_session() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["zones", "list"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_login_rejects_short_username() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["login", "--username", "al"])
        .env("DNSDECK_PASSWORD", "pw")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Username must be at least 3 characters"));
}

#[test]
fn test_login_requires_password() {
    let home = TempDir::new().unwrap();
    dnsdeck_cmd(&home)
        .args(["login", "--username", "alice", "--password-stdin"])
        .write_stdin("\n")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Password is required"));
}

// ── Session flow ────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_session_survives_between_invocations() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "T",
            "username": "alice",
            "role": "admin"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/zones"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [
                { "id": 1, "name": "example.test", "type": "master" },
                { "id": 2, "name": "other.test" }
            ]
        })))
        .mount(&server)
        .await;
    let uri = server.uri();

    dnsdeck_cmd(&home)
        .args(["-u", &uri, "login", "--username", "alice"])
        .env("DNSDECK_PASSWORD", "pw")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stderr(predicate::str::contains("Signed in"));

    let output = dnsdeck_cmd(&home)
        .args(["-u", &uri, "whoami", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let user: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "admin");

    dnsdeck_cmd(&home)
        .args(["-u", &uri, "zones", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("example.test\nother.test\n");

    dnsdeck_cmd(&home)
        .args(["-u", &uri, "logout"])
        .assert()
        .success();

    dnsdeck_cmd(&home)
        .args(["-u", &uri, "whoami"])
        .assert()
        .failure()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_login_exits_with_auth_code() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    dnsdeck_cmd(&home)
        .args(["-u", &server.uri(), "login", "--username", "alice"])
        .env("DNSDECK_PASSWORD", "wrong")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Invalid credentials"));
}
