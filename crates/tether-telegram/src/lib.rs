// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram delivery adapter for the Tether bridge.
//!
//! Implements [`DeliveryAdapter`] against the Telegram Bot API
//! (`sendMessage`, `getMe`) with a plain `reqwest` client. The delivery loop
//! owns retries; this adapter makes exactly one attempt per chunk.

pub mod split;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tether_config::model::TelegramConfig;
use tether_core::error::TetherError;
use tether_core::traits::{DeliveryAdapter, PluginAdapter};
use tether_core::types::{AdapterType, HealthStatus};
use tracing::debug;

use crate::split::{MAX_MESSAGE_UTF16, split_message};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

/// Telegram delivery adapter implementing [`DeliveryAdapter`].
#[derive(Clone)]
pub struct TelegramDelivery {
    client: reqwest::Client,
    token: String,
    api_base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for TelegramDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramDelivery")
            .field("token", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TelegramDelivery {
    /// Creates a new Telegram delivery adapter.
    ///
    /// Requires `config.bot_token` to be set. `timeout` bounds every API call.
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self, TetherError> {
        let token = config.bot_token.as_deref().map(str::trim).ok_or_else(|| {
            TetherError::Config("telegram.bot_token is required for Telegram delivery".into())
        })?;

        if token.is_empty() {
            return Err(TetherError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TetherError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            token: token.to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base_url, self.token)
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: Option<&B>,
    ) -> Result<(), TetherError> {
        let mut request = self.client.post(self.method_url(method));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(method, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let parsed = serde_json::from_str::<ApiResponse>(&body).ok();
        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            Some(api) => Err(TetherError::Delivery {
                message: format!(
                    "telegram {method} failed ({}): {}",
                    api.error_code.unwrap_or(status.as_u16()),
                    api.description.unwrap_or_else(|| "no description".into())
                ),
                source: None,
            }),
            None => Err(TetherError::Delivery {
                message: format!("telegram {method} returned {status} with unreadable body"),
                source: None,
            }),
        }
    }

    /// Map a transport error, dropping the URL so the token never leaks.
    fn transport_error(&self, method: &str, e: reqwest::Error) -> TetherError {
        if e.is_timeout() {
            return TetherError::Timeout {
                duration: self.timeout,
            };
        }
        let e = e.without_url();
        TetherError::Delivery {
            message: format!("telegram {method} request failed: {e}"),
            source: Some(Box::new(e)),
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramDelivery {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Delivery
    }

    async fn health_check(&self) -> Result<HealthStatus, TetherError> {
        match self.call::<()>("getMe", None).await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), TetherError> {
        debug!("Telegram delivery shutting down");
        Ok(())
    }
}

#[async_trait]
impl DeliveryAdapter for TelegramDelivery {
    /// Sends each chunk in order. A failure part-way leaves earlier chunks
    /// delivered, and the retry on the next tick sends them again.
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), TetherError> {
        let chunks = split_message(text, MAX_MESSAGE_UTF16);
        for (index, chunk) in chunks.iter().enumerate() {
            let request = SendMessageRequest {
                chat_id: destination,
                text: chunk,
            };
            self.call("sendMessage", Some(&request)).await?;
            debug!(
                chat_id = destination,
                part = index + 1,
                parts = chunks.len(),
                "telegram message sent"
            );
        }
        Ok(())
    }

    fn request_count(&self, text: &str) -> usize {
        split_message(text, MAX_MESSAGE_UTF16).len().max(1)
    }
}
