// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message list with append/find/mutate primitives.
//!
//! The store knows nothing about files or locking. [`crate::MessageQueue`]
//! wraps it in a mutex and persists a [`MessageStore::snapshot`] after every
//! mutation.

use serde::{Deserialize, Serialize};
use tether_core::{Message, MessageId, MessageStatus, TetherError};

/// Number of messages per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub replied: usize,
    pub consumed: usize,
    pub total: usize,
}

impl StatusCounts {
    /// Count for a single status.
    pub fn get(&self, status: MessageStatus) -> usize {
        match status {
            MessageStatus::Pending => self.pending,
            MessageStatus::Processing => self.processing,
            MessageStatus::Replied => self.replied,
            MessageStatus::Consumed => self.consumed,
        }
    }
}

/// Canonical list of messages, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Messages matching `predicate`, in insertion order.
    pub fn find_all<P>(&self, predicate: P) -> Vec<&Message>
    where
        P: Fn(&Message) -> bool,
    {
        self.messages.iter().filter(|m| predicate(m)).collect()
    }

    /// Apply `f` to the message with `id` and return the updated message.
    ///
    /// The edit is made on a copy and only committed if the status did not
    /// move backwards, the id is unchanged, and a reply is only present on
    /// `replied` or `consumed` messages.
    pub fn mutate_in_place<F>(&mut self, id: &MessageId, f: F) -> Result<&Message, TetherError>
    where
        F: FnOnce(&mut Message),
    {
        let index = self
            .messages
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| TetherError::Internal(format!("no message with id {id}")))?;

        let current = &self.messages[index];
        let mut updated = current.clone();
        f(&mut updated);

        if updated.id != current.id {
            return Err(TetherError::Internal(format!(
                "message id is immutable ({} -> {})",
                current.id, updated.id
            )));
        }
        if !current.status.can_advance_to(updated.status) {
            return Err(TetherError::InvalidTransition {
                id: id.to_string(),
                from: current.status,
                to: updated.status,
            });
        }
        if updated.reply.is_some()
            && !matches!(
                updated.status,
                MessageStatus::Replied | MessageStatus::Consumed
            )
        {
            return Err(TetherError::Internal(format!(
                "message {id} carries a reply while {}",
                updated.status
            )));
        }

        self.messages[index] = updated;
        Ok(&self.messages[index])
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            total: self.messages.len(),
            ..StatusCounts::default()
        };
        for message in &self.messages {
            match message.status {
                MessageStatus::Pending => counts.pending += 1,
                MessageStatus::Processing => counts.processing += 1,
                MessageStatus::Replied => counts.replied += 1,
                MessageStatus::Consumed => counts.consumed += 1,
            }
        }
        counts
    }

    /// Serialize the full message array as pretty JSON.
    pub fn snapshot(&self) -> Result<Vec<u8>, TetherError> {
        serde_json::to_vec_pretty(&self.messages).map_err(TetherError::persistence)
    }

    /// Parse a snapshot produced by [`snapshot`](Self::snapshot).
    ///
    /// Anything other than a JSON array of messages is an error; the caller
    /// decides how to recover.
    pub fn restore(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let messages: Vec<Message> = serde_json::from_slice(bytes)?;
        Ok(Self { messages })
    }

    /// Shrink the store to at most `max` entries.
    ///
    /// Oldest `consumed` entries go first; only if that is not enough are the
    /// oldest entries of any status dropped. Returns what was evicted.
    pub fn evict_beyond(&mut self, max: usize) -> Vec<Message> {
        let mut excess = self.messages.len().saturating_sub(max);
        if excess == 0 {
            return Vec::new();
        }

        let mut evicted = Vec::with_capacity(excess);
        let mut kept = Vec::with_capacity(self.messages.len());
        for message in self.messages.drain(..) {
            if excess > 0 && message.status == MessageStatus::Consumed {
                excess -= 1;
                evicted.push(message);
            } else {
                kept.push(message);
            }
        }

        if excess > 0 {
            evicted.extend(kept.drain(..excess));
        }
        self.messages = kept;
        evicted
    }
}
