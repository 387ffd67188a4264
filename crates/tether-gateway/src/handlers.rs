// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the bridge operations.
//!
//! Field names follow the peers' wire format (`chatId`, `messageId`, ...).

use std::str::FromStr;
use std::time::Duration;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tether_bridge::{ConsumeRequest, HealthReport};
use tether_core::{Message, MessageStatus, Originator, Peer, TetherError};

use crate::server::GatewayState;

/// Request body for POST /incoming.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub chat_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Response body for POST /incoming.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingResponse {
    pub ok: bool,
    pub message_id: String,
}

/// Query string for GET /consume.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeParams {
    pub target: String,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub consume: bool,
    #[serde(default, rename = "timeout_ms")]
    pub timeout_ms: u64,
}

/// Response body for GET /consume.
#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub messages: Vec<Message>,
}

/// Request body for POST /reply.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub chat_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Response body for POST /reply.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub ok: bool,
    pub message_id: String,
    /// False when no claimed message matched and a standalone reply was queued.
    pub matched: bool,
}

/// Query string for GET /pending-reply/{chatId}.
#[derive(Debug, Deserialize)]
pub struct PendingReplyParams {
    #[serde(default)]
    pub consume: Option<bool>,
}

/// Response body for GET /pending-reply/{chatId}.
#[derive(Debug, Serialize)]
pub struct PendingReplyResponse {
    pub reply: Option<String>,
}

/// Response body for POST /heartbeat/{peer}.
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub ok: bool,
    pub peer: Peer,
    pub timestamp: DateTime<Utc>,
}

/// Query string for GET /messages.
#[derive(Debug, Deserialize)]
pub struct MessagesParams {
    #[serde(default)]
    pub status: Option<String>,
}

/// Response body for GET /messages.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub count: usize,
    pub messages: Vec<Message>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Malformed bodies and query strings get the same `{error}` 400 as
/// validation failures.
fn rejection_response(kind: &str, detail: String) -> Response {
    error_response(StatusCode::BAD_REQUEST, format!("invalid {kind}: {detail}"))
}

fn json_rejection(err: JsonRejection) -> Response {
    rejection_response("request body", err.body_text())
}

fn query_rejection(err: QueryRejection) -> Response {
    rejection_response("query string", err.body_text())
}

/// Map a bridge error to a status code: caller faults are 4xx, the rest 500.
fn bridge_error(err: TetherError) -> Response {
    let status = match &err {
        TetherError::Validation(_) => StatusCode::BAD_REQUEST,
        TetherError::UnknownPeer(_) => StatusCode::NOT_FOUND,
        _ => {
            tracing::error!(error = %err, "bridge operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, err.to_string())
}

/// POST /incoming
///
/// Gateway posts a chat message; it is queued as `pending`.
pub async fn post_incoming(
    State(state): State<GatewayState>,
    payload: Result<Json<IncomingRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(err) => return json_rejection(err),
    };
    let originator = Originator::new(
        body.user_id.unwrap_or_default(),
        body.username.unwrap_or_else(|| "unknown".to_string()),
    );
    match state
        .bridge
        .enqueue_incoming(&body.chat_id, originator, &body.text)
        .await
    {
        Ok(id) => (
            StatusCode::OK,
            Json(IncomingResponse {
                ok: true,
                message_id: id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => bridge_error(e),
    }
}

/// GET /consume
///
/// Claims work for the named target, optionally long-polling up to `timeout_ms`.
pub async fn get_consume(
    State(state): State<GatewayState>,
    params: Result<Query<ConsumeParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(err) => return query_rejection(err),
    };
    let Ok(target) = Peer::from_str(params.target.trim()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "unknown target `{}`, expected orchestrator or gateway",
                params.target
            ),
        );
    };

    let mut request =
        ConsumeRequest::new(target).with_wait(Duration::from_millis(params.timeout_ms));
    if let Some(chat_id) = params.chat_id {
        request = request.with_correlation_id(chat_id);
    }
    if params.consume {
        request = request.marking_consumed();
    }

    match state.bridge.consume(request).await {
        Ok(messages) => (StatusCode::OK, Json(ConsumeResponse { messages })).into_response(),
        Err(e) => bridge_error(e),
    }
}

/// POST /reply
///
/// Orchestrator posts a reply; it is matched to a claimed message or queued
/// as a standalone outbound reply.
pub async fn post_reply(
    State(state): State<GatewayState>,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(err) => return json_rejection(err),
    };
    match state
        .bridge
        .reply(&body.chat_id, &body.text, body.message_id.as_deref())
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ReplyResponse {
                ok: true,
                message_id: outcome.id().to_string(),
                matched: outcome.is_matched(),
            }),
        )
            .into_response(),
        Err(e) => bridge_error(e),
    }
}

/// GET /pending-reply/{chatId}
///
/// Latest reply for a chat; consumed unless `consume=false`.
pub async fn get_pending_reply(
    State(state): State<GatewayState>,
    Path(chat_id): Path<String>,
    params: Result<Query<PendingReplyParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(err) => return query_rejection(err),
    };
    let consume = params.consume.unwrap_or(true);
    match state.bridge.fetch_reply(&chat_id, consume).await {
        Ok(reply) => (StatusCode::OK, Json(PendingReplyResponse { reply })).into_response(),
        Err(e) => bridge_error(e),
    }
}

/// POST /heartbeat/{peer}
pub async fn post_heartbeat(
    State(state): State<GatewayState>,
    Path(peer): Path<String>,
) -> Response {
    match state.bridge.heartbeat(&peer) {
        Ok((peer, timestamp)) => (
            StatusCode::OK,
            Json(HeartbeatResponse {
                ok: true,
                peer,
                timestamp,
            }),
        )
            .into_response(),
        Err(e) => bridge_error(e),
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(state.bridge.health().await)
}

/// GET /messages
///
/// Debug listing of the whole queue, optionally filtered by status.
pub async fn get_messages(
    State(state): State<GatewayState>,
    params: Result<Query<MessagesParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(err) => return query_rejection(err),
    };
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match MessageStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("unknown status `{raw}`"),
                );
            }
        },
    };

    let messages = state.bridge.messages(status).await;
    (
        StatusCode::OK,
        Json(MessagesResponse {
            count: messages.len(),
            messages,
        }),
    )
        .into_response()
}

/// GET /metrics
///
/// Prometheus text exposition, or 404 when metrics are disabled.
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "metrics are disabled"),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
        }
    }
}

/// Chat ids arrive as strings from some gateways and as numbers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
