// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end bridge testing.
//!
//! `TestHarness` assembles a queue file in a temp directory, a [`Bridge`]
//! over it, and a [`DeliveryLoop`] wired to a [`MockDelivery`]. Tests drive
//! delivery explicitly with [`TestHarness::tick`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tether_bridge::{Bridge, DeliveryLoop, DeliveryReport};
use tether_core::TetherError;
use tether_store::MessageQueue;

use crate::mock_delivery::MockDelivery;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    provider_online: bool,
    max_messages: Option<usize>,
    heartbeat_window: Duration,
    delivery_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            provider_online: true,
            max_messages: None,
            heartbeat_window: Duration::from_secs(15),
            delivery_timeout: Duration::from_secs(1),
        }
    }

    /// Start with the mock provider unreachable.
    pub fn with_provider_offline(mut self) -> Self {
        self.provider_online = false;
        self
    }

    /// Bound queue retention.
    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = Some(max);
        self
    }

    pub fn with_heartbeat_window(mut self, window: Duration) -> Self {
        self.heartbeat_window = window;
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Build the harness, creating the temp directory and queue file.
    pub async fn build(self) -> Result<TestHarness, TetherError> {
        let temp_dir = tempfile::TempDir::new().map_err(TetherError::persistence)?;
        let queue_path = temp_dir.path().join("queue.json");

        let queue = Arc::new(MessageQueue::open(&queue_path, self.max_messages)?);
        let bridge = Arc::new(Bridge::new(Arc::clone(&queue), self.heartbeat_window));

        let delivery = Arc::new(MockDelivery::new());
        delivery.set_online(self.provider_online);
        let delivery_loop = DeliveryLoop::new(
            Arc::clone(&queue),
            delivery.clone(),
            Duration::from_secs(5),
            self.delivery_timeout,
        );

        Ok(TestHarness {
            bridge,
            queue,
            delivery,
            delivery_loop,
            queue_path,
            max_messages: self.max_messages,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete bridge over a temp queue file with a mock provider.
pub struct TestHarness {
    pub bridge: Arc<Bridge>,
    pub queue: Arc<MessageQueue>,
    pub delivery: Arc<MockDelivery>,
    delivery_loop: DeliveryLoop,
    queue_path: PathBuf,
    max_messages: Option<usize>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default options.
    pub async fn new() -> Result<Self, TetherError> {
        Self::builder().build().await
    }

    /// Run one delivery tick.
    pub async fn tick(&self) -> DeliveryReport {
        self.delivery_loop.tick().await
    }

    pub fn queue_path(&self) -> &std::path::Path {
        &self.queue_path
    }

    /// Load a second queue from the same file, as a restarted process would.
    pub fn reopen(&self) -> Result<MessageQueue, TetherError> {
        MessageQueue::open(&self.queue_path, self.max_messages)
    }
}

#[cfg(test)]
mod tests {
    use tether_core::{MessageStatus, Originator};

    use super::*;

    #[tokio::test]
    async fn harness_builds_with_empty_queue() {
        let harness = TestHarness::new().await.unwrap();
        assert_eq!(harness.queue.counts().await.total, 0);
        assert!(harness.delivery.is_online());
    }

    #[tokio::test]
    async fn reopen_sees_persisted_messages() {
        let harness = TestHarness::new().await.unwrap();
        harness
            .bridge
            .enqueue_incoming("c1", Originator::new("1", "ana"), "hello")
            .await
            .unwrap();
        let reopened = harness.reopen().unwrap();
        let messages = reopened.messages(None).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].status, MessageStatus::Pending);
    }

    #[tokio::test]
    async fn offline_builder_option() {
        let harness = TestHarness::builder()
            .with_provider_offline()
            .build()
            .await
            .unwrap();
        assert!(!harness.delivery.is_online());
    }
}
