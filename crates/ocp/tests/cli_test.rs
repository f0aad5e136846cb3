//! Integration tests for the `ocp` CLI binary.
//!
//! Argument parsing, error exit codes, and end-to-end runs against a mocked
//! GraphQL endpoint. No live portal is needed.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ocp` binary with env isolation.
///
/// Clears all `OCP_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn ocp_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ocp");
    cmd.env("HOME", "/tmp/ocp-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ocp-cli-test-nonexistent")
        .env_remove("OCP_PROFILE")
        .env_remove("OCP_ENDPOINT")
        .env_remove("OCP_TOKEN")
        .env_remove("OCP_OUTPUT")
        .env_remove("OCP_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const SHADOW_TOML: &str = r#"
region = "SE"
vcenter_id = "vc-1"
project_id = "proj-2"
tier_id = "tier-2"
hostname = "legacy-db"
uuid = "4203-bb"
note = "db primary"
"#;

fn shadow_node() -> serde_json::Value {
    json!({
        "__typename": "VirtualHostNode",
        "id": "vh-3",
        "uuid": "4203-bb",
        "hostname": "legacy-db",
        "note": "db primary",
        "state": "RUNNING",
        "region": "SE",
        "tier": { "id": "tier-2" },
        "project": { "id": "proj-2" },
        "customer": { "id": "cust-2" },
        "vcenter": { "id": "vc-1", "name": "vc-prod" }
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = ocp_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    ocp_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("host").and(predicate::str::contains("lookup")),
    );
}

#[test]
fn test_host_apply_requires_file() {
    ocp_cmd()
        .args(["host", "apply", "--state", "web01.json"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn test_unknown_kind_is_rejected() {
    ocp_cmd()
        .args(["host", "refresh", "--kind", "bare-metal", "--state", "x.json"])
        .assert()
        .failure()
        .code(2);
}

// ── Error exit codes ────────────────────────────────────────────────

#[test]
fn test_missing_token_exits_with_auth_code() {
    let output = ocp_cmd()
        .args(["host", "refresh", "--state", "web01.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("OCP_TOKEN"));
}

#[test]
fn test_refresh_without_state_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("absent.json");
    ocp_cmd()
        .args(["--token", "t", "--endpoint", "http://127.0.0.1:9/"])
        .args(["host", "refresh", "--state"])
        .arg(&state)
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("No state file"));
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shadow_apply_writes_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("virtualHostCreateCaas"))
        .and(body_partial_json(json!({
            "variables": { "input": { "vcenter": "vc-1", "uuid": "4203-bb" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "virtualHostCreateCaas": shadow_node() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let desired = dir.path().join("legacy-db.toml");
    let state = dir.path().join("legacy-db.json");
    std::fs::write(&desired, SHADOW_TOML).unwrap();

    let mut cmd = ocp_cmd();
    cmd.args(["--token", "t", "--endpoint", &server.uri(), "-o", "json"])
        .args(["host", "apply", "--kind", "shadow", "--file"])
        .arg(&desired)
        .arg("--state")
        .arg(&state);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["action"], "created");
    assert_eq!(summary["id"], "vh-3");

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["kind"], "shadow");
    assert_eq!(saved["host"]["id"], "vh-3");
    assert_eq!(saved["host"]["customer_id"], "cust-2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lookup_prints_plain_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("TierByName"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "tierList": { "edges": [{ "node": { "id": "tier-7", "name": "GOLD" } }] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = ocp_cmd();
    cmd.args(["--token", "t", "--endpoint", &server.uri(), "-o", "plain"])
        .args(["lookup", "tier", "GOLD"]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "tier-7");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_token_falls_back_to_environment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-Auth-Token", "env-token"))
        .and(body_string_contains("TierByName"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "tierList": { "edges": [{ "node": { "id": "tier-7", "name": "GOLD" } }] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = ocp_cmd();
    cmd.env("OCP_TOKEN", "env-token")
        .args(["--endpoint", &server.uri(), "-o", "json-compact"])
        .args(["lookup", "tier", "GOLD"]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"kind":"tier","id":"tier-7"}"#
    );
}
