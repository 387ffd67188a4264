// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tether bridge.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Tether configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    /// Bridge identity and logging.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Queue file settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Peer liveness settings.
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// Outbound delivery loop settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Telegram Bot API settings used by the delivery loop.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Prometheus metrics settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// MCP tool endpoint settings.
    #[serde(default)]
    pub mcp: McpConfig,
}

/// Bridge identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Display name of this bridge instance.
    #[serde(default = "default_bridge_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: default_bridge_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bridge_name() -> String {
    "tether".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the HTTP server to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Queue file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the JSON queue file.
    #[serde(default = "default_queue_path")]
    pub queue_path: String,

    /// Retention bound. `None` keeps every message forever.
    #[serde(default)]
    pub max_messages: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            queue_path: default_queue_path(),
            max_messages: None,
        }
    }
}

impl StorageConfig {
    pub fn queue_path(&self) -> PathBuf {
        PathBuf::from(&self.queue_path)
    }
}

fn default_queue_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tether").join("queue.json"))
        .unwrap_or_else(|| PathBuf::from("queue.json"))
        .to_string_lossy()
        .into_owned()
}

/// Peer liveness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeartbeatConfig {
    /// A peer not heard from for this many seconds is reported offline.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
        }
    }
}

impl HeartbeatConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

fn default_window_secs() -> u64 {
    15
}

/// Outbound delivery loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Run the delivery loop when a provider is configured.
    #[serde(default = "default_delivery_enabled")]
    pub enabled: bool,

    /// Seconds between delivery ticks.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-call timeout for the provider's send API, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_delivery_enabled(),
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DeliveryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_delivery_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

/// Telegram Bot API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables outbound delivery.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Base URL of the Bot API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[redacted]"))
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Prometheus metrics configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default)]
    pub enabled: bool,
}

/// MCP tool endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct McpConfig {
    /// Mount the MCP streamable HTTP endpoint on the gateway listener.
    #[serde(default = "default_mcp_enabled")]
    pub enabled: bool,

    /// Route the endpoint is mounted at.
    #[serde(default = "default_mcp_path")]
    pub path: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            enabled: default_mcp_enabled(),
            path: default_mcp_path(),
        }
    }
}

fn default_mcp_enabled() -> bool {
    true
}

fn default_mcp_path() -> String {
    "/mcp".to_string()
}
