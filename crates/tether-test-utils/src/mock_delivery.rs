// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery adapter for deterministic testing.
//!
//! `MockDelivery` implements `DeliveryAdapter`. It can be taken offline to
//! simulate a provider outage, slowed down to exercise timeouts, and records
//! every successful send for assertions.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use tether_core::TetherError;
use tether_core::traits::adapter::PluginAdapter;
use tether_core::traits::delivery::DeliveryAdapter;
use tether_core::types::{AdapterType, HealthStatus};

/// A mock messaging provider.
pub struct MockDelivery {
    online: AtomicBool,
    latency: Option<Duration>,
    parts: usize,
    attempts: AtomicUsize,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockDelivery {
    /// An online provider with no latency.
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            latency: None,
            parts: 1,
            attempts: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Delay every send by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Pretend every reply needs `parts` provider requests, each paying the
    /// configured latency.
    pub fn with_parts(mut self, parts: usize) -> Self {
        self.parts = parts.max(1);
        self
    }

    /// Toggle the simulated outage.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// `(destination, text)` pairs that were delivered successfully.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every call to `deliver`, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockDelivery {
    fn name(&self) -> &str {
        "mock-delivery"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Delivery
    }

    async fn health_check(&self) -> Result<HealthStatus, TetherError> {
        if self.is_online() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("provider offline".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), TetherError> {
        Ok(())
    }
}

#[async_trait]
impl DeliveryAdapter for MockDelivery {
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), TetherError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            for _ in 0..self.parts {
                tokio::time::sleep(latency).await;
            }
        }
        if !self.is_online() {
            return Err(TetherError::Delivery {
                message: format!("provider offline, could not reach {destination}"),
                source: None,
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((destination.to_string(), text.to_string()));
        Ok(())
    }

    fn request_count(&self, _text: &str) -> usize {
        self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deliver_captures_sends() {
        let mock = MockDelivery::new();
        mock.deliver("c1", "hello").await.unwrap();
        assert_eq!(mock.sent(), vec![("c1".to_string(), "hello".to_string())]);
        assert_eq!(mock.attempts(), 1);
    }

    #[tokio::test]
    async fn offline_mock_fails_without_capturing() {
        let mock = MockDelivery::new();
        mock.set_online(false);
        let err = mock.deliver("c1", "hello").await.unwrap_err();
        assert!(matches!(err, TetherError::Delivery { .. }));
        assert!(mock.sent().is_empty());
        assert_eq!(mock.attempts(), 1);
        assert!(matches!(
            mock.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn back_online_delivers_again() {
        let mock = MockDelivery::new();
        mock.set_online(false);
        assert!(mock.deliver("c1", "a").await.is_err());
        mock.set_online(true);
        assert!(mock.deliver("c1", "a").await.is_ok());
        assert_eq!(mock.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied() {
        let mock = MockDelivery::new().with_latency(Duration::from_secs(3));
        let start = tokio::time::Instant::now();
        mock.deliver("c1", "slow").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
