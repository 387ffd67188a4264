// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether serve` command implementation.
//!
//! Opens the queue file, builds the bridge, starts the outbound delivery loop
//! when a provider is configured, and serves the HTTP API until SIGINT or
//! SIGTERM. The queue is flushed once everything has stopped.

use std::sync::Arc;

use tether_bridge::{Bridge, shutdown};
use tether_config::TetherConfig;
use tether_core::TetherError;
use axum::Router;
use tether_gateway::{GatewayState, MetricsRender, ServerConfig, router, start_server};
use tether_store::MessageQueue;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs the `tether serve` command.
pub async fn run_serve(config: TetherConfig) -> Result<(), TetherError> {
    init_tracing(&config.bridge.log_level);

    let queue_path = config.storage.queue_path();
    let queue = Arc::new(MessageQueue::open(
        &queue_path,
        config.storage.max_messages,
    )?);
    let counts = queue.counts().await;
    info!(
        name = %config.bridge.name,
        path = %queue_path.display(),
        total = counts.total,
        pending = counts.pending,
        replied = counts.replied,
        "queue loaded"
    );

    let bridge = Arc::new(Bridge::new(Arc::clone(&queue), config.heartbeat.window()));

    let state = match metrics_render(&config)? {
        Some(render) => GatewayState::new(Arc::clone(&bridge)).with_metrics(render),
        None => GatewayState::new(Arc::clone(&bridge)),
    };

    let cancel = shutdown::install_signal_handler();
    let delivery = spawn_delivery(&config, &queue, &cancel).await?;

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let app = router(state).merge(mcp_routes(&config, &bridge, &cancel));
    let served = start_server(&server_config, app, cancel.clone()).await;

    // The server may have stopped on its own (bind failure); stop the loop too.
    cancel.cancel();
    if let Some(task) = delivery {
        if let Err(e) = task.await {
            warn!(error = %e, "delivery loop task ended abnormally");
        }
    }

    if let Err(e) = queue.flush().await {
        error!(error = %e, "final queue flush failed");
    }

    served?;
    info!("tether serve shutdown complete");
    Ok(())
}

#[cfg(feature = "mcp")]
fn mcp_routes(config: &TetherConfig, bridge: &Arc<Bridge>, cancel: &CancellationToken) -> Router {
    if !config.mcp.enabled {
        return Router::new();
    }
    tether_mcp::mcp_router(Arc::clone(bridge), config.mcp.path.trim(), cancel.clone())
}

#[cfg(not(feature = "mcp"))]
fn mcp_routes(config: &TetherConfig, _bridge: &Arc<Bridge>, _cancel: &CancellationToken) -> Router {
    if config.mcp.enabled {
        warn!("mcp.enabled is set but this build has no mcp feature");
    }
    Router::new()
}

#[cfg(feature = "prometheus")]
fn metrics_render(config: &TetherConfig) -> Result<Option<MetricsRender>, TetherError> {
    use tether_core::ObservabilityAdapter;
    use tether_prometheus::PrometheusAdapter;

    if !config.prometheus.enabled {
        return Ok(None);
    }
    let adapter = Arc::new(PrometheusAdapter::new()?);
    let render: MetricsRender = Arc::new(move || adapter.render());
    Ok(Some(render))
}

#[cfg(not(feature = "prometheus"))]
fn metrics_render(config: &TetherConfig) -> Result<Option<MetricsRender>, TetherError> {
    if config.prometheus.enabled {
        warn!("prometheus.enabled is set but this build has no prometheus feature");
    }
    Ok(None)
}

#[cfg(feature = "telegram")]
async fn spawn_delivery(
    config: &TetherConfig,
    queue: &Arc<MessageQueue>,
    cancel: &CancellationToken,
) -> Result<Option<JoinHandle<()>>, TetherError> {
    use tether_bridge::DeliveryLoop;
    use tether_core::{HealthStatus, PluginAdapter};
    use tether_telegram::TelegramDelivery;

    if !config.delivery.enabled {
        info!("outbound delivery disabled by configuration");
        return Ok(None);
    }
    if config.telegram.bot_token.is_none() {
        info!("no telegram.bot_token configured, outbound replies wait for gateway pickup");
        return Ok(None);
    }

    let adapter = Arc::new(TelegramDelivery::new(
        &config.telegram,
        config.delivery.timeout(),
    )?);

    // A provider outage at startup is not fatal; the loop keeps retrying.
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!("telegram provider reachable"),
        Ok(HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason)) => {
            warn!(reason = %reason, "telegram provider not healthy at startup");
        }
        Err(e) => warn!(error = %e, "telegram health check failed"),
    }

    let delivery_loop = DeliveryLoop::new(
        Arc::clone(queue),
        adapter,
        config.delivery.interval(),
        config.delivery.timeout(),
    );
    Ok(Some(tokio::spawn(delivery_loop.run(cancel.clone()))))
}

#[cfg(not(feature = "telegram"))]
async fn spawn_delivery(
    config: &TetherConfig,
    _queue: &Arc<MessageQueue>,
    _cancel: &CancellationToken,
) -> Result<Option<JoinHandle<()>>, TetherError> {
    if config.telegram.bot_token.is_some() {
        warn!("telegram.bot_token is set but this build has no telegram feature");
    }
    Ok(None)
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over `bridge.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tether={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
