// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram delivery adapter against a mock Bot API.

use std::time::Duration;

use serde_json::json;
use tether_config::model::TelegramConfig;
use tether_core::{DeliveryAdapter, HealthStatus, PluginAdapter, TetherError};
use tether_telegram::TelegramDelivery;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:test-token";

fn adapter(server: &MockServer, timeout: Duration) -> TelegramDelivery {
    let config = TelegramConfig {
        bot_token: Some(TOKEN.into()),
        api_base_url: server.uri(),
    };
    TelegramDelivery::new(&config, timeout).unwrap()
}

fn ok_body() -> serde_json::Value {
    json!({"ok": true, "result": {"message_id": 1}})
}

#[tokio::test]
async fn deliver_posts_chat_id_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_json(json!({"chat_id": "c2", "text": "proactive note"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    adapter(&server, Duration::from_secs(5))
        .deliver("c2", "proactive note")
        .await
        .unwrap();
}

#[tokio::test]
async fn ok_false_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let err = adapter(&server, Duration::from_secs(5))
        .deliver("c2", "note")
        .await
        .unwrap_err();
    assert!(matches!(err, TetherError::Delivery { .. }));
    assert!(err.to_string().contains("blocked"), "got {err}");
}

#[tokio::test]
async fn server_error_is_a_failure_without_token_in_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = adapter(&server, Duration::from_secs(5))
        .deliver("c2", "note")
        .await
        .unwrap_err();
    assert!(!err.to_string().contains(TOKEN));
}

#[tokio::test]
async fn long_text_sent_in_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(3)
        .mount(&server)
        .await;

    let text = "z".repeat(4096 * 2 + 10);
    adapter(&server, Duration::from_secs(5))
        .deliver("c9", &text)
        .await
        .unwrap();
}

#[tokio::test]
async fn emoji_text_chunked_by_utf16_length() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(2)
        .mount(&server)
        .await;

    // 4096 chars but 8192 UTF-16 code units.
    let text = "😀".repeat(4096);
    adapter(&server, Duration::from_secs(5))
        .deliver("c9", &text)
        .await
        .unwrap();
}

#[tokio::test]
async fn slow_api_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = adapter(&server, Duration::from_millis(200))
        .deliver("c2", "note")
        .await
        .unwrap_err();
    assert!(matches!(err, TetherError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn health_check_uses_get_me() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/getMe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"id": 1, "is_bot": true, "first_name": "tether"}
        })))
        .mount(&server)
        .await;

    let status = adapter(&server, Duration::from_secs(5))
        .health_check()
        .await
        .unwrap();
    assert_eq!(status, HealthStatus::Healthy);
}

#[tokio::test]
async fn health_check_reports_unhealthy_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let status = adapter(&server, Duration::from_secs(5))
        .health_check()
        .await
        .unwrap();
    assert!(matches!(status, HealthStatus::Unhealthy(_)));
}
