// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splitting long replies to fit the Bot API message limit.
//!
//! Telegram measures text length in UTF-16 code units, so a character
//! outside the Basic Multilingual Plane (most emoji) counts twice.

/// Maximum UTF-16 code units in one Telegram text message.
pub const MAX_MESSAGE_UTF16: usize = 4096;

/// Length of `text` as Telegram counts it.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Split `text` into chunks of at most `max_units` UTF-16 code units.
///
/// Prefers breaking after the last newline inside a chunk; falls back to a
/// hard break on a character boundary. Never returns an empty chunk for
/// non-empty input.
pub fn split_message(text: &str, max_units: usize) -> Vec<&str> {
    let max_units = max_units.max(2);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let hard_end = hard_break(rest, max_units);

        if hard_end == rest.len() {
            chunks.push(rest);
            break;
        }

        let end = match rest[..hard_end].rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => hard_end,
        };
        chunks.push(&rest[..end]);
        rest = &rest[end..];
    }

    chunks
}

/// Byte offset of the longest prefix of `text` within `max_units`.
fn hard_break(text: &str, max_units: usize) -> usize {
    let mut units = 0;
    for (offset, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return offset;
        }
    }
    text.len()
}
