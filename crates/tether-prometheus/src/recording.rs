// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a
//! no-op, so the bridge records unconditionally.

use metrics::{describe_counter, describe_gauge};

/// Register all Tether metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "tether_messages_enqueued_total",
        "Incoming messages posted by the gateway"
    );
    describe_counter!(
        "tether_messages_claimed_total",
        "Pending messages claimed by the orchestrator"
    );
    describe_counter!(
        "tether_replies_total",
        "Replies accepted, by kind (matched or synthesized)"
    );
    describe_counter!(
        "tether_deliveries_total",
        "Outbound delivery attempts, by result (ok or failed)"
    );
    describe_gauge!("tether_queue_depth", "Messages in the queue by status");
}

/// Record an enqueued incoming message.
pub fn record_enqueued() {
    metrics::counter!("tether_messages_enqueued_total").increment(1);
}

/// Record messages claimed in one consume call.
pub fn record_claimed(count: usize) {
    if count > 0 {
        metrics::counter!("tether_messages_claimed_total").increment(count as u64);
    }
}

/// Record an accepted reply.
pub fn record_reply(matched: bool) {
    let kind = if matched { "matched" } else { "synthesized" };
    metrics::counter!("tether_replies_total", "kind" => kind).increment(1);
}

/// Record one delivery attempt.
pub fn record_delivery(ok: bool) {
    let result = if ok { "ok" } else { "failed" };
    metrics::counter!("tether_deliveries_total", "result" => result).increment(1);
}

/// Set the queue depth for one status.
pub fn set_queue_depth(status: &str, count: usize) {
    metrics::gauge!("tether_queue_depth", "status" => status.to_string()).set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        register_metrics();
        record_enqueued();
        record_claimed(0);
        record_claimed(3);
        record_reply(true);
        record_reply(false);
        record_delivery(true);
        record_delivery(false);
        set_queue_depth("pending", 4);
    }
}
