// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line tests running the compiled `tether` binary.

use std::path::Path;
use std::process::{Command, Output};

fn tether(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tether"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("TETHER_TELEGRAM_BOT_TOKEN")
        .env_remove("TETHER_SERVER_PORT")
        .output()
        .unwrap()
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("tether.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn config_command_redacts_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "[telegram]\nbot_token = \"123456:very-secret\"\n\n[server]\nport = 4123\n",
    );

    let out = tether(&path, &["config"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("port = 4123"));
    assert!(stdout.contains("[redacted]"));
    assert!(!stdout.contains("very-secret"));
}

#[test]
fn unknown_config_key_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\nprot = 3001\n");

    let out = tether(&path, &["config"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("prot"));
}

#[test]
fn invalid_value_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[heartbeat]\nwindow_secs = 0\n");

    let out = tether(&path, &["config"]);
    assert!(!out.status.success());
}

#[test]
fn status_json_reports_not_running() {
    let dir = tempfile::tempdir().unwrap();
    // Port 9 (discard) is never served by the bridge in tests.
    let path = write_config(&dir, "[server]\nport = 9\n");

    let out = tether(&path, &["status", "--json"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["running"], false);
    assert_eq!(json["endpoint"], "http://127.0.0.1:9/health");
}
