// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport for the Tether bridge.
//!
//! Exposes the bridge operations to the gateway and orchestrator processes
//! as a small JSON API served by axum.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, MetricsRender, ServerConfig, router, start_server};
