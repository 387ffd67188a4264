// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tether bridge.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::MessageStatus;

/// The primary error type used across the bridge, its adapters, and the store.
#[derive(Debug, Error)]
pub enum TetherError {
    /// Boundary validation failure (missing correlation id, empty text, ...).
    /// Rejected before anything touches the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The persisted queue file could not be parsed.
    #[error("corrupt queue file {}: {reason}", path.display())]
    PersistenceCorruption { path: PathBuf, reason: String },

    /// Writing or renaming the queue file failed.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery to the external messaging provider failed.
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A message status was asked to move backwards.
    #[error("invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: MessageStatus,
        to: MessageStatus,
    },

    /// A peer name outside the known set.
    #[error("unknown peer: {0}")]
    UnknownPeer(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TetherError {
    /// Wraps an I/O or serialization failure from the persistence layer.
    pub fn persistence(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence {
            source: Box::new(source),
        }
    }

    /// True for errors caused by caller input rather than bridge state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownPeer(_))
    }
}
