// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared, durable queue handed to the bridge and the delivery loop.

use std::path::{Path, PathBuf};

use tether_core::{Message, MessageId, MessageStatus, Originator, Peer, TetherError};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::persistence::QueueFile;
use crate::state_machine::{self, ReplyOutcome};
use crate::store::{MessageStore, StatusCounts};

/// A [`MessageStore`] behind a lock, persisted after every mutation.
///
/// Each operation selects, mutates, and persists while holding the lock, so
/// two concurrent consumers can never claim the same message. File writes
/// run on the blocking pool. A failed save is logged and the in-memory state
/// stays authoritative.
#[derive(Debug)]
pub struct MessageQueue {
    store: Mutex<MessageStore>,
    file: QueueFile,
    max_messages: Option<usize>,
}

impl MessageQueue {
    /// Load the queue file at `path`, recovering from a crash or corruption.
    ///
    /// `max_messages` bounds retention; `None` keeps everything.
    pub fn open(path: impl Into<PathBuf>, max_messages: Option<usize>) -> Result<Self, TetherError> {
        let file = QueueFile::new(path);
        let report = file.load()?;
        info!(
            path = %file.path().display(),
            messages = report.store.len(),
            recovered = report.corrupt_backup.is_some(),
            "message queue opened"
        );
        Ok(Self {
            store: Mutex::new(report.store),
            file,
            max_messages,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn enqueue_incoming(
        &self,
        correlation_id: &str,
        originator: Originator,
        text: &str,
    ) -> Message {
        let mut store = self.store.lock().await;
        let message = state_machine::enqueue_incoming(&mut store, correlation_id, originator, text);
        self.persist(&mut store).await;
        message
    }

    pub async fn consume(
        &self,
        target: Peer,
        correlation_id: Option<&str>,
        mark_consumed: bool,
    ) -> Result<Vec<Message>, TetherError> {
        let mut store = self.store.lock().await;
        let claimed = state_machine::consume(&mut store, target, correlation_id, mark_consumed)?;
        let mutated = !claimed.is_empty() && (target == Peer::Orchestrator || mark_consumed);
        if mutated {
            self.persist(&mut store).await;
        }
        Ok(claimed)
    }

    pub async fn apply_reply(
        &self,
        correlation_id: &str,
        text: &str,
        explicit_id: Option<&str>,
    ) -> Result<ReplyOutcome, TetherError> {
        let mut store = self.store.lock().await;
        let outcome = state_machine::apply_reply(&mut store, correlation_id, text, explicit_id)?;
        self.persist(&mut store).await;
        Ok(outcome)
    }

    pub async fn fetch_reply(
        &self,
        correlation_id: &str,
        consume: bool,
    ) -> Result<Option<String>, TetherError> {
        let mut store = self.store.lock().await;
        let reply = state_machine::fetch_reply(&mut store, correlation_id, consume)?;
        if consume && reply.is_some() {
            self.persist(&mut store).await;
        }
        Ok(reply)
    }

    /// Outbound replies waiting for the delivery loop.
    pub async fn awaiting_delivery(&self) -> Vec<Message> {
        state_machine::awaiting_delivery(&*self.store.lock().await)
    }

    /// Record a successful delivery. `false` if a poller consumed it first.
    pub async fn mark_delivered(&self, id: &MessageId) -> Result<bool, TetherError> {
        let mut store = self.store.lock().await;
        let changed = state_machine::mark_delivered(&mut store, id)?;
        if changed {
            self.persist(&mut store).await;
        }
        Ok(changed)
    }

    pub async fn counts(&self) -> StatusCounts {
        self.store.lock().await.counts()
    }

    /// Copy of every message, optionally restricted to one status.
    pub async fn messages(&self, status: Option<MessageStatus>) -> Vec<Message> {
        let store = self.store.lock().await;
        store
            .find_all(|m| status.is_none_or(|s| m.status == s))
            .into_iter()
            .cloned()
            .collect()
    }

    /// Write the current state to disk, returning any error.
    ///
    /// Called once more on shutdown.
    pub async fn flush(&self) -> Result<(), TetherError> {
        let store = self.store.lock().await;
        self.file.save_async(store.snapshot()?).await
    }

    /// Evict beyond the retention bound, then save. The lock stays held
    /// across the write so no later mutation can reach disk first.
    async fn persist(&self, store: &mut MessageStore) {
        if let Some(max) = self.max_messages {
            for evicted in store.evict_beyond(max) {
                if evicted.status != MessageStatus::Consumed {
                    warn!(
                        message_id = %evicted.id,
                        correlation_id = %evicted.correlation_id,
                        status = %evicted.status,
                        max_messages = max,
                        "evicted unfinished message to stay within retention bound"
                    );
                }
            }
        }

        let result = match store.snapshot() {
            Ok(bytes) => self.file.save_async(bytes).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            error!(
                error = %e,
                path = %self.file.path().display(),
                "failed to persist queue, continuing with in-memory state"
            );
        }
    }
}
