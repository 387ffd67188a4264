// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: a usable bind address,
//! non-zero intervals, a well-formed provider URL.

use crate::diagnostic::ConfigError;
use crate::model::TetherConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Gateway routes the MCP endpoint must not shadow.
const GATEWAY_ROUTES: &[&str] = &[
    "/incoming",
    "/consume",
    "/reply",
    "/pending-reply",
    "/heartbeat",
    "/health",
    "/messages",
    "/metrics",
];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &TetherConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.bridge.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "bridge.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.bridge.log_level
        )));
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::validation(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must not be 0"));
    }

    if config.storage.queue_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.queue_path must not be empty"));
    }

    if config.storage.max_messages == Some(0) {
        errors.push(ConfigError::validation(
            "storage.max_messages must be at least 1 when set",
        ));
    }

    for (key, value) in [
        ("heartbeat.window_secs", config.heartbeat.window_secs),
        ("delivery.interval_secs", config.delivery.interval_secs),
        ("delivery.timeout_secs", config.delivery.timeout_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!(
                "{key} must be at least 1, got 0"
            )));
        }
    }

    let base = config.telegram.api_base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "telegram.api_base_url must start with http:// or https://, got `{base}`"
        )));
    }

    if config.telegram.bot_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        errors.push(ConfigError::validation(
            "telegram.bot_token must not be empty when set",
        ));
    }

    let mcp_path = config.mcp.path.trim();
    if !mcp_path.starts_with('/') || mcp_path == "/" {
        errors.push(ConfigError::validation(format!(
            "mcp.path must start with `/` and name a route, got `{mcp_path}`"
        )));
    } else if GATEWAY_ROUTES
        .iter()
        .any(|route| mcp_path == *route || mcp_path.starts_with(&format!("{route}/")))
    {
        errors.push(ConfigError::validation(format!(
            "mcp.path `{mcp_path}` collides with a gateway route"
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
