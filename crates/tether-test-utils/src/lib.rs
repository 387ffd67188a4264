// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tether integration tests.
//!
//! Provides a mock delivery adapter and a harness that assembles a queue,
//! a bridge, and a delivery loop over a temp directory, so tests run without
//! a real messaging provider.
//!
//! # Components
//!
//! - [`MockDelivery`] - Delivery adapter that can be switched offline and captures sends
//! - [`TestHarness`] - Temp-dir backed queue, bridge, and delivery loop

pub mod harness;
pub mod mock_delivery;

pub use harness::TestHarness;
pub use mock_delivery::MockDelivery;
