// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MCP tool interface for the orchestrator.
//!
//! Exposes the orchestrator-side bridge operations (claim pending messages,
//! post a reply, read bridge health) as MCP tools, served over streamable
//! HTTP on the gateway listener.

pub mod tools;

pub use tools::{BridgeTools, PendingMessagesArgs, SendReplyArgs};

use std::sync::Arc;

use axum::Router;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use tether_bridge::Bridge;
use tokio_util::sync::CancellationToken;

/// Router serving the MCP endpoint at `path`.
///
/// Each MCP session gets its own [`BridgeTools`] over the shared bridge.
/// Open sessions end when `cancel` fires.
pub fn mcp_router(bridge: Arc<Bridge>, path: &str, cancel: CancellationToken) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(BridgeTools::new(Arc::clone(&bridge))),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: cancel.child_token(),
            ..Default::default()
        },
    );
    tracing::info!(path, "MCP endpoint mounted");
    Router::new().nest_service(path, service)
}
