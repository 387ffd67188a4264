// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable message queue for the Tether bridge.
//!
//! Layers, bottom-up:
//! - [`store`]: the in-memory message list and its mutation primitives,
//! - [`persistence`]: the crash-safe JSON file (temp write, fsync, rename),
//! - [`state_machine`]: lifecycle transitions, reply correlation, consume,
//! - [`queue`]: [`MessageQueue`], the locked store shared across tasks.

pub mod persistence;
pub mod queue;
pub mod state_machine;
pub mod store;

pub use persistence::{LoadReport, QueueFile};
pub use queue::MessageQueue;
pub use state_machine::ReplyOutcome;
pub use store::{MessageStore, StatusCounts};
