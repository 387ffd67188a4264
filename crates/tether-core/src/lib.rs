// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tether message bridge.
//!
//! This crate provides the message model, the error type, and the adapter
//! traits shared by the store, the bridge service, and the delivery and
//! metrics adapters.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TetherError;
pub use types::{AdapterType, HealthStatus, Message, MessageId, MessageStatus, Originator, Peer};

pub use traits::{DeliveryAdapter, ObservabilityAdapter, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tether_error_variants_render() {
        let validation = TetherError::Validation("chatId is required".into());
        assert_eq!(validation.to_string(), "validation error: chatId is required");
        assert!(validation.is_validation());

        let corrupt = TetherError::PersistenceCorruption {
            path: "/tmp/queue.json".into(),
            reason: "expected array".into(),
        };
        assert!(corrupt.to_string().contains("/tmp/queue.json"));
        assert!(!corrupt.is_validation());

        let transition = TetherError::InvalidTransition {
            id: "msg-1".into(),
            from: MessageStatus::Consumed,
            to: MessageStatus::Pending,
        };
        assert_eq!(
            transition.to_string(),
            "invalid transition for msg-1: consumed -> pending"
        );

        let persistence = TetherError::persistence(std::io::Error::other("disk full"));
        assert!(persistence.to_string().contains("disk full"));

        let timeout = TetherError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        assert!(timeout.to_string().contains("10s"));

        assert!(TetherError::UnknownPeer("julia".into()).is_validation());
    }

    #[test]
    fn adapter_type_serialization() {
        let delivery = AdapterType::Delivery;
        let json = serde_json::to_string(&delivery).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(delivery, parsed);
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_delivery_adapter<T: DeliveryAdapter>() {}
        fn _assert_observability_adapter<T: ObservabilityAdapter>() {}
    }
}
