// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Peer liveness from last-contact timestamps.
//!
//! Every bridge operation attributable to a peer touches it; a peer is alive
//! while its last contact is younger than the window. Purely observational:
//! nothing routes or retries based on liveness.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tether_core::Peer;

/// Last contact per peer, `None` if never seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerHeartbeats {
    pub orchestrator: Option<DateTime<Utc>>,
    pub gateway: Option<DateTime<Utc>>,
}

/// Liveness per peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerLiveness {
    pub orchestrator: bool,
    pub gateway: bool,
}

#[derive(Debug)]
pub struct HeartbeatTracker {
    window: Duration,
    last_seen: RwLock<HashMap<Peer, DateTime<Utc>>>,
}

impl HeartbeatTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: RwLock::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record contact from `peer` now.
    pub fn touch(&self, peer: Peer) -> DateTime<Utc> {
        let now = Utc::now();
        self.touch_at(peer, now);
        now
    }

    /// Record contact from `peer` at a given instant.
    pub fn touch_at(&self, peer: Peer, at: DateTime<Utc>) {
        let mut map = self.last_seen.write().unwrap_or_else(|e| e.into_inner());
        map.insert(peer, at);
    }

    pub fn last_seen(&self, peer: Peer) -> Option<DateTime<Utc>> {
        let map = self.last_seen.read().unwrap_or_else(|e| e.into_inner());
        map.get(&peer).copied()
    }

    pub fn is_alive(&self, peer: Peer) -> bool {
        self.is_alive_at(peer, Utc::now())
    }

    /// Liveness as of `now`. Never-seen peers are not alive.
    pub fn is_alive_at(&self, peer: Peer, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_seen(peer) else {
            return false;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed < self.window,
            // Contact recorded "after" now: clock skew between calls.
            Err(_) => true,
        }
    }

    pub fn snapshot(&self) -> PeerHeartbeats {
        PeerHeartbeats {
            orchestrator: self.last_seen(Peer::Orchestrator),
            gateway: self.last_seen(Peer::Gateway),
        }
    }

    pub fn liveness_at(&self, now: DateTime<Utc>) -> PeerLiveness {
        PeerLiveness {
            orchestrator: self.is_alive_at(Peer::Orchestrator, now),
            gateway: self.is_alive_at(Peer::Gateway, now),
        }
    }
}
