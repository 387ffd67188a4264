// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle transitions and reply correlation.
//!
//! Every function here runs against an exclusively borrowed
//! [`MessageStore`], so selection and mutation happen in one step. Callers
//! hold the queue lock for the duration.

use tether_core::{Message, MessageId, MessageStatus, Originator, Peer, TetherError};
use tracing::debug;

use crate::store::MessageStore;

/// How a reply was attached to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// An in-flight `processing` message now carries the reply.
    Matched(MessageId),
    /// No claim was open; a standalone outbound reply was created.
    Synthesized(MessageId),
}

impl ReplyOutcome {
    pub fn id(&self) -> &MessageId {
        match self {
            Self::Matched(id) | Self::Synthesized(id) => id,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Append a fresh `pending` message.
pub fn enqueue_incoming(
    store: &mut MessageStore,
    correlation_id: &str,
    originator: Originator,
    text: &str,
) -> Message {
    let message = Message::incoming(correlation_id, originator, text);
    store.append(message.clone());
    message
}

/// Find the claimed message a reply for `correlation_id` belongs to.
///
/// An `explicit_id` wins when it names a `processing` message of the same
/// conversation. Otherwise the most recently created `processing` message is
/// taken.
pub fn match_for_reply<'a>(
    store: &'a MessageStore,
    correlation_id: &str,
    explicit_id: Option<&str>,
) -> Option<&'a Message> {
    let candidates = store.find_all(|m| {
        m.correlation_id == correlation_id && m.status == MessageStatus::Processing
    });

    let explicit_match = explicit_id
        .and_then(|explicit| candidates.iter().copied().find(|m| m.id.as_str() == explicit));
    if explicit_match.is_some() {
        return explicit_match;
    }

    if candidates.len() > 1 {
        debug!(
            correlation_id,
            candidates = candidates.len(),
            "ambiguous reply correlation, taking the most recent claim"
        );
    }
    candidates.last().copied()
}

/// Attach `text` as the reply for `correlation_id`.
pub fn apply_reply(
    store: &mut MessageStore,
    correlation_id: &str,
    text: &str,
    explicit_id: Option<&str>,
) -> Result<ReplyOutcome, TetherError> {
    let matched = match_for_reply(store, correlation_id, explicit_id).map(|m| m.id.clone());

    match matched {
        Some(id) => {
            store.mutate_in_place(&id, |m| {
                m.reply = Some(text.to_string());
                m.status = MessageStatus::Replied;
            })?;
            Ok(ReplyOutcome::Matched(id))
        }
        None => {
            let message = Message::synthesized_reply(correlation_id, text);
            let id = message.id.clone();
            store.append(message);
            Ok(ReplyOutcome::Synthesized(id))
        }
    }
}

/// Claim work for `target`.
///
/// The orchestrator claims `pending` messages (moving them to `processing`).
/// The gateway receives `replied` messages and, with `mark_consumed`, moves
/// them to `consumed`; without it the call is a peek. Results come back in
/// insertion order, post-mutation.
pub fn consume(
    store: &mut MessageStore,
    target: Peer,
    correlation_id: Option<&str>,
    mark_consumed: bool,
) -> Result<Vec<Message>, TetherError> {
    let wanted = target.consumes();
    let selected: Vec<MessageId> = store
        .find_all(|m| {
            m.status == wanted && correlation_id.is_none_or(|c| m.correlation_id == c)
        })
        .into_iter()
        .map(|m| m.id.clone())
        .collect();

    let next = match target {
        Peer::Orchestrator => Some(MessageStatus::Processing),
        Peer::Gateway if mark_consumed => Some(MessageStatus::Consumed),
        Peer::Gateway => None,
    };

    let mut claimed = Vec::with_capacity(selected.len());
    for id in &selected {
        let message = match next {
            Some(status) => store.mutate_in_place(id, |m| m.status = status)?.clone(),
            None => match store.get(id) {
                Some(m) => m.clone(),
                None => continue,
            },
        };
        claimed.push(message);
    }
    Ok(claimed)
}

/// The latest reply waiting for `correlation_id`, optionally consuming it.
pub fn fetch_reply(
    store: &mut MessageStore,
    correlation_id: &str,
    consume: bool,
) -> Result<Option<String>, TetherError> {
    let latest = store
        .find_all(|m| {
            m.correlation_id == correlation_id
                && m.status == MessageStatus::Replied
                && m.reply.is_some()
        })
        .last()
        .map(|m| (m.id.clone(), m.reply.clone()));

    let Some((id, reply)) = latest else {
        return Ok(None);
    };

    if consume {
        store.mutate_in_place(&id, |m| m.status = MessageStatus::Consumed)?;
    }
    Ok(reply)
}

/// Outbound replies the delivery loop still has to push.
pub fn awaiting_delivery(store: &MessageStore) -> Vec<Message> {
    store
        .find_all(Message::awaits_delivery)
        .into_iter()
        .cloned()
        .collect()
}

/// Mark an outbound reply delivered.
///
/// Returns `false` without changing anything when the message is gone or no
/// longer `replied` (a gateway poll got to it first).
pub fn mark_delivered(store: &mut MessageStore, id: &MessageId) -> Result<bool, TetherError> {
    match store.get(id) {
        Some(m) if m.status == MessageStatus::Replied => {
            store.mutate_in_place(id, |m| m.status = MessageStatus::Consumed)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
