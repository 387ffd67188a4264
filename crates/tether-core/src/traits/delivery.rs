// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery adapter trait for pushing replies to an external messaging provider.

use async_trait::async_trait;

use crate::error::TetherError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for the external provider's send API.
///
/// The outbound delivery loop calls [`deliver`](DeliveryAdapter::deliver) for
/// every proactive reply. Implementations must not retry internally; the loop
/// retries the whole reply on its next tick, so a provider that sends a reply
/// as several requests may repeat parts that already went out.
#[async_trait]
pub trait DeliveryAdapter: PluginAdapter {
    /// Sends `text` to `destination` (the message's correlation id).
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), TetherError>;

    /// Number of provider requests `deliver` makes for `text`.
    ///
    /// The delivery loop grants one timeout per request.
    fn request_count(&self, _text: &str) -> usize {
        1
    }
}
