// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics adapter for the Tether bridge.
//!
//! Uses the metrics-rs facade with the Prometheus exporter.
//! Metrics are rendered as Prometheus text format via the `render()` method,
//! which is exposed through the gateway's /metrics endpoint.

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use tether_core::TetherError;
use tether_core::traits::adapter::PluginAdapter;
use tether_core::traits::observability::ObservabilityAdapter;
use tether_core::types::{AdapterType, HealthStatus};

pub use recording::{
    record_claimed, record_delivery, record_enqueued, record_reply, set_queue_depth,
};

/// Prometheus metrics adapter.
///
/// Installs the Prometheus recorder and keeps the handle used to render it.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Install the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process; a second call errors.
    pub fn new() -> Result<Self, TetherError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            TetherError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Wrap an existing handle, e.g. one built with `build_recorder()` in tests.
    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, TetherError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TetherError> {
        Ok(())
    }
}

impl ObservabilityAdapter for PrometheusAdapter {
    fn render(&self) -> String {
        self.handle.render()
    }
}

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    fn local_adapter() -> (PrometheusAdapter, metrics_exporter_prometheus::PrometheusRecorder) {
        let recorder = PrometheusBuilder::new().build_recorder();
        let adapter = PrometheusAdapter::from_handle(recorder.handle());
        (adapter, recorder)
    }

    #[tokio::test]
    async fn adapter_identity_and_health() {
        let (adapter, _recorder) = local_adapter();
        assert_eq!(adapter.name(), "prometheus");
        assert_eq!(adapter.adapter_type(), AdapterType::Observability);
        assert_eq!(adapter.health_check().await.unwrap(), HealthStatus::Healthy);
        adapter.shutdown().await.unwrap();
    }

    #[test]
    fn render_includes_recorded_counters() {
        let (adapter, recorder) = local_adapter();
        metrics::with_local_recorder(&recorder, || {
            record_enqueued();
            record_delivery(false);
            set_queue_depth("replied", 2);
        });
        let text = adapter.render();
        assert!(text.contains("tether_messages_enqueued_total"), "got {text}");
        assert!(text.contains("result=\"failed\""), "got {text}");
        assert!(text.contains("tether_queue_depth"), "got {text}");
    }
}
