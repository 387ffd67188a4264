// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool handlers mapped onto [`Bridge`] operations.
//!
//! Every call counts as an orchestrator heartbeat, the same as the HTTP
//! routes the orchestrator uses.

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tether_bridge::{Bridge, ConsumeRequest};
use tether_core::{Peer, TetherError};
use tracing::debug;

/// Arguments of `get_pending_messages`.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PendingMessagesArgs {
    /// Only claim messages for this chat.
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Seconds to wait for work when none is pending (capped at 30).
    #[serde(default)]
    pub wait_secs: Option<u64>,
}

/// Arguments of `send_reply`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendReplyArgs {
    /// Chat to reply to, from the pending message.
    pub chat_id: String,
    /// Reply text, delivered as written.
    pub text: String,
    /// Id of the message being answered, when known.
    #[serde(default)]
    pub message_id: Option<String>,
}

/// MCP server handler over a shared [`Bridge`].
#[derive(Clone)]
pub struct BridgeTools {
    bridge: Arc<Bridge>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BridgeTools {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self {
            bridge,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Claim pending chat messages waiting for a reply. Claimed messages move to processing. Optionally waits up to wait_secs for one to arrive."
    )]
    async fn get_pending_messages(
        &self,
        Parameters(args): Parameters<PendingMessagesArgs>,
    ) -> Result<CallToolResult, McpError> {
        let value = self.pending_messages(args).await.map_err(to_mcp_error)?;
        Ok(json_result(&value))
    }

    #[tool(
        description = "Reply to a chat. Answers the claimed message for chat_id, or queues a standalone message for delivery when none is open."
    )]
    async fn send_reply(
        &self,
        Parameters(args): Parameters<SendReplyArgs>,
    ) -> Result<CallToolResult, McpError> {
        let value = self.reply(args).await.map_err(to_mcp_error)?;
        Ok(json_result(&value))
    }

    #[tool(description = "Bridge health: message counts by status and peer liveness.")]
    async fn bridge_status(&self) -> Result<CallToolResult, McpError> {
        let value = self.status().await.map_err(to_mcp_error)?;
        Ok(json_result(&value))
    }
}

impl BridgeTools {
    /// Names of the registered tools.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    /// `get_pending_messages` body: `{"count": n, "messages": [...]}`.
    pub async fn pending_messages(&self, args: PendingMessagesArgs) -> Result<Value, TetherError> {
        let mut request = ConsumeRequest::new(Peer::Orchestrator)
            .with_wait(Duration::from_secs(args.wait_secs.unwrap_or(0)));
        if let Some(chat_id) = args.chat_id {
            request = request.with_correlation_id(chat_id);
        }
        let messages = self.bridge.consume(request).await?;
        debug!(count = messages.len(), "pending messages claimed over MCP");
        Ok(json!({ "count": messages.len(), "messages": messages }))
    }

    /// `send_reply` body: `{"ok": true, "messageId": .., "matched": ..}`.
    pub async fn reply(&self, args: SendReplyArgs) -> Result<Value, TetherError> {
        let outcome = self
            .bridge
            .reply(&args.chat_id, &args.text, args.message_id.as_deref())
            .await?;
        Ok(json!({
            "ok": true,
            "messageId": outcome.id().to_string(),
            "matched": outcome.is_matched(),
        }))
    }

    /// `bridge_status` body: the `/health` report.
    pub async fn status(&self) -> Result<Value, TetherError> {
        self.bridge.heartbeats().touch(Peer::Orchestrator);
        let report = self.bridge.health().await;
        serde_json::to_value(report).map_err(|e| TetherError::Internal(e.to_string()))
    }
}

#[tool_handler]
impl ServerHandler for BridgeTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tether".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Poll get_pending_messages for chat messages, answer each with send_reply, \
                 and check bridge_status when replies stop flowing."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

fn json_result(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

fn to_mcp_error(err: TetherError) -> McpError {
    match err {
        TetherError::Validation(message) => McpError::invalid_params(message, None),
        other => McpError::internal_error(other.to_string(), None),
    }
}
