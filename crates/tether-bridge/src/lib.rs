// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridge service for Tether.
//!
//! Ties the durable queue to its two peers: the [`Bridge`] operations the
//! gateway and orchestrator call, peer liveness tracking, the outbound
//! [`DeliveryLoop`], and signal-driven shutdown.

pub mod bridge;
pub mod delivery;
pub mod health;
pub mod heartbeat;
pub mod shutdown;

pub use bridge::{Bridge, CONSUME_POLL_INTERVAL, ConsumeRequest, MAX_CONSUME_WAIT};
pub use delivery::{DeliveryLoop, DeliveryReport};
pub use health::{BridgeStatus, HealthReport};
pub use heartbeat::{HeartbeatTracker, PeerHeartbeats, PeerLiveness};
pub use tether_store::ReplyOutcome;
