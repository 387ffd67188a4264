// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod delivery;
pub mod observability;

pub use adapter::PluginAdapter;
pub use delivery::DeliveryAdapter;
pub use observability::ObservabilityAdapter;
