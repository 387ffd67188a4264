// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message and peer types shared by the store, the bridge, and the adapters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Unique identifier for a bridged message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Id for a message posted by the gateway.
    pub fn incoming() -> Self {
        Self(format!("msg-{}", uuid::Uuid::new_v4()))
    }

    /// Id for a reply the bridge synthesized with no prior incoming message.
    pub fn synthesized() -> Self {
        Self(format!("reply-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a message. Only ever moves forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
    /// Posted by the gateway, waiting for the orchestrator.
    Pending,
    /// Claimed by the orchestrator, reply not yet produced.
    Processing,
    /// Reply produced, waiting for pickup or delivery.
    Replied,
    /// Reply picked up by the gateway or delivered by the bridge.
    Consumed,
}

impl MessageStatus {
    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Replied => 2,
            Self::Consumed => 3,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    ///
    /// Staying in the same state is allowed; skipping states is allowed
    /// (a synthesized reply is born `replied`).
    pub const fn can_advance_to(self, next: MessageStatus) -> bool {
        next.rank() >= self.rank()
    }
}

/// The two agents the bridge sits between.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Peer {
    /// Generates replies; claims `pending` work.
    Orchestrator,
    /// Talks to the chat network; posts incoming messages and picks up replies.
    Gateway,
}

impl Peer {
    /// Status a consume call made by this peer selects.
    pub const fn consumes(self) -> MessageStatus {
        match self {
            Self::Orchestrator => MessageStatus::Pending,
            Self::Gateway => MessageStatus::Replied,
        }
    }
}

/// Sender of an incoming message as reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Originator {
    pub id: String,
    pub name: String,
}

impl Originator {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A single entry in the bridge queue.
///
/// Field names follow the persisted layout (`correlationId`, `createdAt`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    /// Conversation (chat) this message belongs to.
    pub correlation_id: String,
    pub originator_id: String,
    pub originator_name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub outbound: bool,
}

impl Message {
    /// A fresh `pending` message posted by the gateway.
    pub fn incoming(
        correlation_id: impl Into<String>,
        originator: Originator,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::incoming(),
            correlation_id: correlation_id.into(),
            originator_id: originator.id,
            originator_name: originator.name,
            text: text.into(),
            reply: None,
            created_at: Utc::now(),
            status: MessageStatus::Pending,
            outbound: false,
        }
    }

    /// A standalone reply with no incoming message behind it.
    ///
    /// Born `replied` and flagged `outbound` so the delivery loop pushes it.
    pub fn synthesized_reply(correlation_id: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            id: MessageId::synthesized(),
            correlation_id: correlation_id.into(),
            originator_id: String::new(),
            originator_name: String::new(),
            text: String::new(),
            reply: Some(reply.into()),
            created_at: Utc::now(),
            status: MessageStatus::Replied,
            outbound: true,
        }
    }

    /// Waiting for the delivery loop: outbound and not yet consumed.
    pub fn awaits_delivery(&self) -> bool {
        self.outbound && self.status == MessageStatus::Replied
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter plugged into the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Delivery,
    Observability,
}
