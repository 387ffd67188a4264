// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether status` command implementation.
//!
//! Queries the health endpoint of a running bridge and prints queue depth
//! and peer liveness. Reports "not running" when the bridge is unreachable.

use std::io::IsTerminal;
use std::time::Duration;

use serde::Serialize;
use tether_bridge::HealthReport;
use tether_config::TetherConfig;
use tether_core::TetherError;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthReport>,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Run the `tether status` command.
pub async fn run_status(config: &TetherConfig, json: bool, plain: bool) -> Result<(), TetherError> {
    let endpoint = format!("http://{}:{}/health", config.server.host, config.server.port);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| TetherError::Internal(format!("failed to create HTTP client: {e}")))?;

    let health = match client.get(&endpoint).send().await {
        Ok(resp) if resp.status().is_success() => Some(
            resp.json::<HealthReport>()
                .await
                .map_err(|e| TetherError::Internal(format!("failed to parse health response: {e}")))?,
        ),
        _ => None,
    };

    let response = StatusResponse {
        running: health.is_some(),
        endpoint,
        uptime_human: health.as_ref().map(|h| format_uptime(h.uptime_secs)),
        health,
    };

    if json {
        let out = serde_json::to_string_pretty(&response)
            .map_err(|e| TetherError::Internal(format!("failed to encode status: {e}")))?;
        println!("{out}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_text(&response, use_color));
    }
    Ok(())
}

fn render_text(response: &StatusResponse, use_color: bool) -> String {
    use colored::Colorize;
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  tether status");
    let _ = writeln!(out, "  {}", "-".repeat(35));

    let Some(health) = &response.health else {
        if use_color {
            let _ = writeln!(out, "    State:    {} {}", "✗".red(), "not running".red());
        } else {
            let _ = writeln!(out, "    State:    [FAIL] not running");
        }
        let _ = writeln!(out, "    Endpoint: {}", response.endpoint);
        let _ = writeln!(out);
        let _ = writeln!(out, "  Start with: tether serve");
        let _ = writeln!(out);
        return out;
    };

    let uptime = response.uptime_human.as_deref().unwrap_or("0m");
    let status = health.status.to_string();
    if use_color {
        let (mark, status) = match health.status {
            tether_bridge::BridgeStatus::Ok => ("✓".green(), status.green()),
            tether_bridge::BridgeStatus::Degraded => ("!".yellow(), status.yellow()),
            tether_bridge::BridgeStatus::Down => ("✗".red(), status.red()),
        };
        let _ = writeln!(out, "    State:    {mark} {status} (uptime: {uptime})");
    } else {
        let _ = writeln!(out, "    State:    [{}] {status} (uptime: {uptime})", status.to_uppercase());
    }
    let _ = writeln!(out, "    Version:  {}", health.version);

    let counts = &health.counts;
    let _ = writeln!(
        out,
        "    Queue:    {} total ({} pending, {} processing, {} replied, {} consumed)",
        counts.total, counts.pending, counts.processing, counts.replied, counts.consumed
    );

    for (name, alive) in [
        ("orchestrator", health.peers.orchestrator),
        ("gateway", health.peers.gateway),
    ] {
        let state = match (alive, use_color) {
            (true, true) => "online".green().to_string(),
            (false, true) => "offline".red().to_string(),
            (true, false) => "online".to_string(),
            (false, false) => "offline".to_string(),
        };
        let _ = writeln!(out, "    {:<13} {state}", format!("{name}:"));
    }
    let _ = writeln!(out);
    out
}
