// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observability adapter trait for metrics exposition.

use crate::traits::adapter::PluginAdapter;

/// Adapter exposing collected metrics in a text exposition format.
pub trait ObservabilityAdapter: PluginAdapter {
    /// Renders all collected metrics.
    fn render(&self) -> String;
}
