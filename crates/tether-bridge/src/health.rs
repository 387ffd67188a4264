// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate health snapshot served on `/health`.

use serde::{Deserialize, Serialize};
use tether_store::StatusCounts;

use crate::heartbeat::{PeerHeartbeats, PeerLiveness};

/// Overall bridge state derived from peer liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    /// The orchestrator is reachable; replies are being produced.
    Ok,
    /// Only the gateway is talking to the bridge.
    Degraded,
    /// Neither peer has been heard from within the window.
    Down,
}

impl BridgeStatus {
    pub fn from_liveness(peers: PeerLiveness) -> Self {
        match (peers.orchestrator, peers.gateway) {
            (true, _) => Self::Ok,
            (false, true) => Self::Degraded,
            (false, false) => Self::Down,
        }
    }
}

impl std::fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Degraded => "degraded",
            Self::Down => "down",
        };
        f.write_str(s)
    }
}

/// Counts by status plus per-peer liveness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// The bridge process itself is serving.
    pub ok: bool,
    pub status: BridgeStatus,
    pub version: String,
    pub uptime_secs: u64,
    pub counts: StatusCounts,
    pub heartbeats: PeerHeartbeats,
    pub peers: PeerLiveness,
}
