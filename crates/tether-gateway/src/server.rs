// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the bridge transport.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tether_bridge::Bridge;
use tether_core::TetherError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Renders the Prometheus exposition text for `/metrics`.
pub type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub bridge: Arc<Bridge>,
    /// `None` when metrics are disabled; `/metrics` then answers 404.
    pub prometheus_render: Option<MetricsRender>,
}

impl GatewayState {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self {
            bridge,
            prometheus_render: None,
        }
    }

    pub fn with_metrics(mut self, render: MetricsRender) -> Self {
        self.prometheus_render = Some(render);
        self
    }
}

/// Bind address for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the router with every bridge route.
///
/// - POST /incoming, GET /consume, POST /reply
/// - GET /pending-reply/{chatId}, POST /heartbeat/{peer}
/// - GET /health, GET /messages, GET /metrics
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/incoming", post(handlers::post_incoming))
        .route("/consume", get(handlers::get_consume))
        .route("/reply", post(handlers::post_reply))
        .route("/pending-reply/{chat_id}", get(handlers::get_pending_reply))
        .route("/heartbeat/{peer}", post(handlers::post_heartbeat))
        .route("/health", get(handlers::get_health))
        .route("/messages", get(handlers::get_messages))
        .route("/metrics", get(handlers::get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `app` until `cancel` fires, then drain in-flight requests.
///
/// `app` is usually [`router`], optionally merged with extra endpoints.
pub async fn start_server(
    config: &ServerConfig,
    app: Router,
    cancel: CancellationToken,
) -> Result<(), TetherError> {
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TetherError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("bridge listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| TetherError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("bridge HTTP server stopped");
    Ok(())
}
