// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery loop.
//!
//! Pushes synthesized (`outbound`) replies to the external provider. A
//! failed or timed-out send leaves the message `replied` for the next tick;
//! there is no backoff and no attempt cap. The loop only stops on
//! cancellation.
//!
//! The send timeout applies per provider request, so a reply the adapter
//! splits into several requests gets a proportional budget. Retries resend
//! the whole reply; parts delivered before a failure can arrive twice.

use std::sync::Arc;
use std::time::Duration;

use tether_core::{DeliveryAdapter, Message, TetherError};
use tether_store::MessageQueue;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of one delivery tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct DeliveryLoop {
    queue: Arc<MessageQueue>,
    adapter: Arc<dyn DeliveryAdapter>,
    interval: Duration,
    timeout: Duration,
}

impl DeliveryLoop {
    pub fn new(
        queue: Arc<MessageQueue>,
        adapter: Arc<dyn DeliveryAdapter>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            queue,
            adapter,
            interval,
            timeout,
        }
    }

    /// Attempt every outbound reply once.
    pub async fn tick(&self) -> DeliveryReport {
        let outbound = self.queue.awaiting_delivery().await;
        let mut report = DeliveryReport::default();

        for message in outbound {
            let Some(text) = message.reply.as_deref() else {
                continue;
            };
            report.attempted += 1;

            match self.send(&message, text).await {
                Ok(()) => {
                    report.delivered += 1;
                    record_delivery(true);
                    match self.queue.mark_delivered(&message.id).await {
                        Ok(true) => debug!(
                            message_id = %message.id,
                            correlation_id = %message.correlation_id,
                            "outbound reply delivered"
                        ),
                        Ok(false) => debug!(
                            message_id = %message.id,
                            "reply was picked up by a poller during delivery"
                        ),
                        Err(e) => error!(
                            message_id = %message.id,
                            error = %e,
                            "failed to mark delivered reply consumed"
                        ),
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    record_delivery(false);
                    warn!(
                        message_id = %message.id,
                        correlation_id = %message.correlation_id,
                        error = %e,
                        "outbound delivery failed, will retry next tick"
                    );
                }
            }
        }

        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                delivered = report.delivered,
                failed = report.failed,
                "delivery tick complete"
            );
        }
        report
    }

    async fn send(&self, message: &Message, text: &str) -> Result<(), TetherError> {
        let budget = self.budget(text);
        match tokio::time::timeout(budget, self.adapter.deliver(&message.correlation_id, text))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TetherError::Timeout { duration: budget }),
        }
    }

    /// Time allowed for delivering `text`: one timeout per provider request.
    fn budget(&self, text: &str) -> Duration {
        let requests = u32::try_from(self.adapter.request_count(text).max(1)).unwrap_or(u32::MAX);
        self.timeout.saturating_mul(requests)
    }

    /// Tick immediately, then every interval, until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            adapter = self.adapter.name(),
            interval_secs = self.interval.as_secs(),
            "delivery loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        info!("delivery loop stopped");
    }
}

#[cfg(feature = "prometheus")]
fn record_delivery(ok: bool) {
    tether_prometheus::record_delivery(ok);
}

#[cfg(not(feature = "prometheus"))]
fn record_delivery(_ok: bool) {}
