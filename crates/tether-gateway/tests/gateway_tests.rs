// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests driving the router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tether_gateway::{GatewayState, router};
use tether_test_utils::TestHarness;
use tower::ServiceExt;

async fn app() -> (TestHarness, Router) {
    let harness = TestHarness::new().await.unwrap();
    let app = router(GatewayState::new(Arc::clone(&harness.bridge)));
    (harness, app)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn full_round_trip_over_http() {
    let (_harness, app) = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/incoming",
            json!({"chatId": "c1", "text": "hello", "userId": 7, "username": "ana"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let message_id = body["messageId"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get("/consume?target=orchestrator")).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"], message_id.as_str());
    assert_eq!(messages[0]["status"], "processing");
    assert_eq!(messages[0]["originatorName"], "ana");

    let (status, body) = send(&app, post_json("/reply", json!({"chatId": "c1", "text": "hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], true);
    assert_eq!(body["messageId"], message_id.as_str());

    let (status, body) = send(&app, get("/pending-reply/c1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "hi");

    let (_, body) = send(&app, get("/pending-reply/c1")).await;
    assert!(body["reply"].is_null());
}

#[tokio::test]
async fn blank_text_is_bad_request() {
    let (harness, app) = app().await;

    let (status, body) = send(&app, post_json("/incoming", json!({"chatId": "c1", "text": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation error: text is required");
    assert_eq!(harness.queue.counts().await.total, 0);
}

#[tokio::test]
async fn missing_chat_id_on_reply_is_bad_request() {
    let (_harness, app) = app().await;
    let (status, body) = send(&app, post_json("/reply", json!({"text": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("chatId"));
}

#[tokio::test]
async fn unmatched_reply_reports_synthesized_id() {
    let (_harness, app) = app().await;
    let (status, body) = send(
        &app,
        post_json("/reply", json!({"chatId": "c2", "text": "proactive note"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], false);
    assert!(body["messageId"].as_str().unwrap().starts_with("reply-"));
}

#[tokio::test]
async fn unknown_consume_target_is_bad_request() {
    let (_harness, app) = app().await;
    let (status, body) = send(&app, get("/consume?target=julia")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("julia"));
}

#[tokio::test]
async fn gateway_consume_without_flag_is_a_peek() {
    let (harness, app) = app().await;
    harness.bridge.reply("c3", "note", None).await.unwrap();

    let (_, body) = send(&app, get("/consume?target=gateway&chatId=c3")).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["status"], "replied");

    let (_, body) = send(&app, get("/consume?target=gateway&chatId=c3&consume=true")).await;
    assert_eq!(body["messages"][0]["status"], "consumed");

    let (_, body) = send(&app, get("/consume?target=gateway&chatId=c3")).await;
    assert!(body["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn pending_reply_peek_leaves_reply_in_place() {
    let (harness, app) = app().await;
    harness.bridge.reply("c4", "later", None).await.unwrap();

    let (_, body) = send(&app, get("/pending-reply/c4?consume=false")).await;
    assert_eq!(body["reply"], "later");
    let (_, body) = send(&app, get("/pending-reply/c4")).await;
    assert_eq!(body["reply"], "later");
    let (_, body) = send(&app, get("/pending-reply/c4")).await;
    assert!(body["reply"].is_null());
}

#[tokio::test]
async fn heartbeat_known_and_unknown_peers() {
    let (_harness, app) = app().await;

    let (status, body) = send(&app, post_empty("/heartbeat/orchestrator")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["peer"], "orchestrator");
    assert!(body["timestamp"].is_string());

    let (status, _) = send(&app, post_empty("/heartbeat/toaster")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reflects_counts_and_liveness() {
    let (_harness, app) = app().await;

    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "down");

    send(&app, post_json("/incoming", json!({"chatId": "c1", "text": "hello"}))).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["counts"]["pending"], 1);
    assert_eq!(body["peers"]["gateway"], true);
    assert_eq!(body["peers"]["orchestrator"], false);
}

#[tokio::test]
async fn messages_listing_filters_by_status() {
    let (harness, app) = app().await;
    harness
        .bridge
        .enqueue_incoming("c1", Default::default(), "one")
        .await
        .unwrap();
    harness.bridge.reply("c2", "two", None).await.unwrap();

    let (_, body) = send(&app, get("/messages")).await;
    assert_eq!(body["count"], 2);

    let (_, body) = send(&app, get("/messages?status=replied")).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["messages"][0]["correlationId"], "c2");

    let (status, _) = send(&app, get("/messages?status=lost")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_disabled_is_not_found() {
    let (_harness, app) = app().await;
    let (status, _) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_enabled_serves_rendered_text() {
    let harness = TestHarness::new().await.unwrap();
    let state = GatewayState::new(Arc::clone(&harness.bridge))
        .with_metrics(Arc::new(|| "tether_messages_enqueued_total 3\n".to_string()));
    let app = router(state);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"tether_messages_enqueued_total 3\n");
}

fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn wrong_field_type_is_json_bad_request() {
    let (harness, app) = app().await;

    let (status, body) = send(&app, post_json("/incoming", json!({"chatId": "c1", "text": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));

    let (status, body) = send(&app, post_json("/reply", json!({"chatId": 1.5, "text": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(harness.queue.counts().await.total, 0);
}

#[tokio::test]
async fn malformed_json_is_json_bad_request() {
    let (_harness, app) = app().await;

    for uri in ["/incoming", "/reply"] {
        let (status, body) = send(&app, post_raw(uri, "{\"chatId\": \"c1\", ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn missing_consume_target_is_json_bad_request() {
    let (_harness, app) = app().await;
    let (status, body) = send(&app, get("/consume")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid query string"));
}

#[tokio::test]
async fn reply_text_survives_http_verbatim() {
    let (harness, app) = app().await;
    let block = "  indented\n```\ncode\n```\n";

    send(&app, post_json("/incoming", json!({"chatId": "c1", "text": "  hi  "}))).await;
    send(&app, get("/consume?target=orchestrator")).await;
    let (status, _) = send(&app, post_json("/reply", json!({"chatId": "c1", "text": block}))).await;
    assert_eq!(status, StatusCode::OK);

    let stored = harness.bridge.messages(None).await;
    assert_eq!(stored[0].text, "  hi  ");
    assert_eq!(stored[0].reply.as_deref(), Some(block));

    let (_, body) = send(&app, get("/pending-reply/c1")).await;
    assert_eq!(body["reply"], block);
}
