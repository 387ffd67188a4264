// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The operations the gateway and the orchestrator call.
//!
//! [`Bridge`] validates input at the boundary, touches the calling peer's
//! heartbeat, and forwards to the shared [`MessageQueue`].

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tether_core::{Message, MessageId, MessageStatus, Originator, Peer, TetherError};
use tether_store::{MessageQueue, ReplyOutcome};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::health::{BridgeStatus, HealthReport};
use crate::heartbeat::HeartbeatTracker;

/// Upper bound on how long a consume call may wait for work.
pub const MAX_CONSUME_WAIT: Duration = Duration::from_secs(30);

/// Re-check interval while a consume call is waiting.
pub const CONSUME_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Parameters of a consume call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeRequest {
    pub target: Peer,
    pub correlation_id: Option<String>,
    /// Gateway only: advance `replied` to `consumed` instead of peeking.
    pub mark_consumed: bool,
    /// How long to wait for work before returning empty. Zero is one attempt.
    pub wait: Duration,
}

impl ConsumeRequest {
    pub fn new(target: Peer) -> Self {
        Self {
            target,
            correlation_id: None,
            mark_consumed: false,
            wait: Duration::ZERO,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn marking_consumed(mut self) -> Self {
        self.mark_consumed = true;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }
}

/// Bridge between the gateway and the orchestrator.
pub struct Bridge {
    queue: Arc<MessageQueue>,
    heartbeats: HeartbeatTracker,
    started: Instant,
}

impl Bridge {
    pub fn new(queue: Arc<MessageQueue>, heartbeat_window: Duration) -> Self {
        Self {
            queue,
            heartbeats: HeartbeatTracker::new(heartbeat_window),
            started: Instant::now(),
        }
    }

    pub fn queue(&self) -> &Arc<MessageQueue> {
        &self.queue
    }

    pub fn heartbeats(&self) -> &HeartbeatTracker {
        &self.heartbeats
    }

    /// Accept a message from the gateway as `pending`.
    pub async fn enqueue_incoming(
        &self,
        correlation_id: &str,
        originator: Originator,
        text: &str,
    ) -> Result<MessageId, TetherError> {
        let correlation_id = require("chatId", correlation_id)?;
        let text = require_text(text)?;
        self.heartbeats.touch(Peer::Gateway);

        let message = self
            .queue
            .enqueue_incoming(correlation_id, originator, text)
            .await;
        record_enqueued();
        info!(
            message_id = %message.id,
            correlation_id,
            originator = %message.originator_name,
            "incoming message queued"
        );
        Ok(message.id)
    }

    /// Claim work for `request.target`, waiting up to `request.wait` for it.
    pub async fn consume(&self, request: ConsumeRequest) -> Result<Vec<Message>, TetherError> {
        let correlation_id = match request.correlation_id.as_deref() {
            Some(id) => Some(require("chatId", id)?),
            None => None,
        };
        self.heartbeats.touch(request.target);

        let deadline = Instant::now() + request.wait.min(MAX_CONSUME_WAIT);
        loop {
            let claimed = self
                .queue
                .consume(request.target, correlation_id, request.mark_consumed)
                .await?;

            let now = Instant::now();
            if !claimed.is_empty() || now >= deadline {
                if request.target == Peer::Orchestrator {
                    record_claimed(claimed.len());
                }
                if !claimed.is_empty() {
                    debug!(
                        target_peer = %request.target,
                        count = claimed.len(),
                        "messages consumed"
                    );
                }
                return Ok(claimed);
            }

            tokio::time::sleep(CONSUME_POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    /// Attach a reply from the orchestrator.
    pub async fn reply(
        &self,
        correlation_id: &str,
        text: &str,
        explicit_id: Option<&str>,
    ) -> Result<ReplyOutcome, TetherError> {
        let correlation_id = require("chatId", correlation_id)?;
        let text = require_text(text)?;
        let explicit_id = explicit_id.map(str::trim).filter(|id| !id.is_empty());
        self.heartbeats.touch(Peer::Orchestrator);

        let outcome = self
            .queue
            .apply_reply(correlation_id, text, explicit_id)
            .await?;
        record_reply(outcome.is_matched());
        info!(
            message_id = %outcome.id(),
            correlation_id,
            matched = outcome.is_matched(),
            "reply queued"
        );
        Ok(outcome)
    }

    /// The latest reply waiting for `correlation_id`, if any.
    pub async fn fetch_reply(
        &self,
        correlation_id: &str,
        consume: bool,
    ) -> Result<Option<String>, TetherError> {
        let correlation_id = require("chatId", correlation_id)?;
        self.heartbeats.touch(Peer::Gateway);

        let reply = self.queue.fetch_reply(correlation_id, consume).await?;
        if reply.is_some() && consume {
            info!(correlation_id, "reply picked up by gateway");
        }
        Ok(reply)
    }

    /// Explicit liveness ping from a named peer.
    pub fn heartbeat(&self, peer: &str) -> Result<(Peer, DateTime<Utc>), TetherError> {
        let peer = Peer::from_str(peer.trim())
            .map_err(|_| TetherError::UnknownPeer(peer.to_string()))?;
        let at = self.heartbeats.touch(peer);
        debug!(%peer, "heartbeat");
        Ok((peer, at))
    }

    pub async fn health(&self) -> HealthReport {
        let counts = self.queue.counts().await;
        record_queue_depth(&counts);
        let peers = self.heartbeats.liveness_at(Utc::now());

        HealthReport {
            ok: true,
            status: BridgeStatus::from_liveness(peers),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: self.started.elapsed().as_secs(),
            counts,
            heartbeats: self.heartbeats.snapshot(),
            peers,
        }
    }

    /// Debug view: every message, optionally of one status.
    pub async fn messages(&self, status: Option<MessageStatus>) -> Vec<Message> {
        self.queue.messages(status).await
    }
}

/// Identifiers are trimmed; a blank one is rejected.
fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, TetherError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TetherError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Message bodies are stored verbatim; whitespace-only text is rejected.
fn require_text(text: &str) -> Result<&str, TetherError> {
    if text.trim().is_empty() {
        return Err(TetherError::Validation("text is required".to_string()));
    }
    Ok(text)
}

#[cfg(feature = "prometheus")]
fn record_enqueued() {
    tether_prometheus::record_enqueued();
}

#[cfg(not(feature = "prometheus"))]
fn record_enqueued() {}

#[cfg(feature = "prometheus")]
fn record_claimed(count: usize) {
    tether_prometheus::record_claimed(count);
}

#[cfg(not(feature = "prometheus"))]
fn record_claimed(_count: usize) {}

#[cfg(feature = "prometheus")]
fn record_reply(matched: bool) {
    tether_prometheus::record_reply(matched);
}

#[cfg(not(feature = "prometheus"))]
fn record_reply(_matched: bool) {}

#[cfg(feature = "prometheus")]
fn record_queue_depth(counts: &tether_store::StatusCounts) {
    use strum::IntoEnumIterator;
    for status in MessageStatus::iter() {
        tether_prometheus::set_queue_depth(&status.to_string(), counts.get(status));
    }
}

#[cfg(not(feature = "prometheus"))]
fn record_queue_depth(_counts: &tether_store::StatusCounts) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(dir: &tempfile::TempDir) -> Bridge {
        let queue = MessageQueue::open(dir.path().join("queue.json"), None).unwrap();
        Bridge::new(Arc::new(queue), Duration::from_secs(15))
    }

    #[test]
    fn require_trims_and_rejects_blank() {
        assert_eq!(require("chatId", "  c1 ").unwrap(), "c1");
        let err = require_text("  \n ").unwrap_err();
        assert_eq!(err.to_string(), "validation error: text is required");
    }

    #[tokio::test]
    async fn text_is_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge(&dir);
        let block = "  indented\n```\ncode\n```\n";

        let id = bridge
            .enqueue_incoming(" c1 ", Originator::new("", "unknown"), "  hi  ")
            .await
            .unwrap();
        let claimed = bridge
            .consume(ConsumeRequest::new(Peer::Orchestrator))
            .await
            .unwrap();
        assert_eq!(claimed[0].id, id);
        assert_eq!(claimed[0].correlation_id, "c1");
        assert_eq!(claimed[0].text, "  hi  ");

        bridge.reply("c1", block, None).await.unwrap();
        assert_eq!(bridge.fetch_reply("c1", true).await.unwrap().as_deref(), Some(block));
    }

    #[tokio::test]
    async fn blank_input_never_reaches_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge(&dir);
        let anon = Originator::new("", "unknown");

        assert!(bridge.enqueue_incoming("", anon.clone(), "hi").await.unwrap_err().is_validation());
        assert!(bridge.enqueue_incoming("c1", anon, "").await.unwrap_err().is_validation());
        assert!(bridge.reply(" ", "hi", None).await.unwrap_err().is_validation());
        assert!(bridge.reply("c1", "", None).await.unwrap_err().is_validation());
        assert!(bridge.fetch_reply("", true).await.unwrap_err().is_validation());
        assert_eq!(bridge.queue().counts().await.total, 0);
    }

    #[tokio::test]
    async fn operations_touch_the_calling_peer() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge(&dir);

        bridge
            .enqueue_incoming("c1", Originator::new("1", "ana"), "hi")
            .await
            .unwrap();
        assert!(bridge.heartbeats().is_alive(Peer::Gateway));
        assert!(!bridge.heartbeats().is_alive(Peer::Orchestrator));

        bridge.consume(ConsumeRequest::new(Peer::Orchestrator)).await.unwrap();
        assert!(bridge.heartbeats().is_alive(Peer::Orchestrator));
    }

    #[tokio::test]
    async fn heartbeat_rejects_unknown_peer() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge(&dir);
        let (peer, _) = bridge.heartbeat("Gateway").unwrap();
        assert_eq!(peer, Peer::Gateway);
        assert!(matches!(
            bridge.heartbeat("julia"),
            Err(TetherError::UnknownPeer(name)) if name == "julia"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn consume_wait_gives_up_at_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge(&dir);
        let start = Instant::now();
        let claimed = bridge
            .consume(ConsumeRequest::new(Peer::Orchestrator).with_wait(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(claimed.is_empty());
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn consume_wait_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge(&dir);
        let start = Instant::now();
        bridge
            .consume(ConsumeRequest::new(Peer::Gateway).with_wait(Duration::from_secs(600)))
            .await
            .unwrap();
        assert!(start.elapsed() <= MAX_CONSUME_WAIT + CONSUME_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn health_reflects_counts_and_peers() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = bridge(&dir);
        let report = bridge.health().await;
        assert_eq!(report.status, BridgeStatus::Down);
        assert!(report.ok);

        bridge
            .enqueue_incoming("c1", Originator::new("1", "ana"), "hi")
            .await
            .unwrap();
        let report = bridge.health().await;
        assert_eq!(report.status, BridgeStatus::Degraded);
        assert_eq!(report.counts.pending, 1);
        assert!(report.heartbeats.gateway.is_some());

        bridge.heartbeat("orchestrator").unwrap();
        assert_eq!(bridge.health().await.status, BridgeStatus::Ok);
    }
}
