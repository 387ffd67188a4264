// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool handlers driven against a temp-file bridge.

use std::sync::Arc;
use std::time::Duration;

use rmcp::ServerHandler;
use tether_core::{MessageStatus, Originator, Peer, TetherError};
use tether_mcp::{BridgeTools, PendingMessagesArgs, SendReplyArgs};
use tether_test_utils::TestHarness;

async fn tools() -> (TestHarness, BridgeTools) {
    let harness = TestHarness::new().await.unwrap();
    let tools = BridgeTools::new(Arc::clone(&harness.bridge));
    (harness, tools)
}

fn reply_args(chat_id: &str, text: &str) -> SendReplyArgs {
    SendReplyArgs {
        chat_id: chat_id.to_string(),
        text: text.to_string(),
        message_id: None,
    }
}

#[tokio::test]
async fn registers_the_orchestrator_tools() {
    let (_harness, tools) = tools().await;
    let mut names = tools.tool_names();
    names.sort();
    assert_eq!(names, vec!["bridge_status", "get_pending_messages", "send_reply"]);

    let info = tools.get_info();
    assert!(info.capabilities.tools.is_some());
    assert_eq!(info.server_info.name, "tether");
}

#[tokio::test]
async fn pending_then_reply_round_trip() {
    let (harness, tools) = tools().await;
    harness
        .bridge
        .enqueue_incoming("42", Originator::new("7", "ana"), "hello")
        .await
        .unwrap();

    let pending = tools
        .pending_messages(PendingMessagesArgs::default())
        .await
        .unwrap();
    assert_eq!(pending["count"], 1);
    assert_eq!(pending["messages"][0]["correlationId"], "42");
    assert_eq!(pending["messages"][0]["text"], "hello");

    let replied = tools.reply(reply_args("42", "hi ana")).await.unwrap();
    assert_eq!(replied["ok"], true);
    assert_eq!(replied["matched"], true);

    let reply = harness.bridge.fetch_reply("42", true).await.unwrap();
    assert_eq!(reply.as_deref(), Some("hi ana"));
    assert!(harness.bridge.heartbeats().last_seen(Peer::Orchestrator).is_some());
}

#[tokio::test]
async fn reply_without_claim_is_standalone() {
    let (harness, tools) = tools().await;
    let replied = tools.reply(reply_args("99", "reminder")).await.unwrap();
    assert_eq!(replied["matched"], false);

    let messages = harness.bridge.messages(Some(MessageStatus::Replied)).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].outbound);
}

#[tokio::test]
async fn blank_reply_is_rejected() {
    let (_harness, tools) = tools().await;
    let err = tools.reply(reply_args("42", "   ")).await.unwrap_err();
    assert!(matches!(err, TetherError::Validation(_)));
}

#[tokio::test]
async fn chat_filter_leaves_other_chats_pending() {
    let (harness, tools) = tools().await;
    for chat in ["a", "b"] {
        harness
            .bridge
            .enqueue_incoming(chat, Originator::new("1", "u"), "msg")
            .await
            .unwrap();
    }

    let pending = tools
        .pending_messages(PendingMessagesArgs {
            chat_id: Some("b".into()),
            wait_secs: None,
        })
        .await
        .unwrap();
    assert_eq!(pending["count"], 1);
    assert_eq!(pending["messages"][0]["correlationId"], "b");
    assert_eq!(harness.queue.counts().await.pending, 1);
}

#[tokio::test]
async fn pending_waits_for_a_late_message() {
    let (harness, tools) = tools().await;
    let bridge = Arc::clone(&harness.bridge);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        bridge
            .enqueue_incoming("late", Originator::new("1", "u"), "finally")
            .await
            .unwrap();
    });

    let pending = tools
        .pending_messages(PendingMessagesArgs {
            chat_id: None,
            wait_secs: Some(5),
        })
        .await
        .unwrap();
    assert_eq!(pending["count"], 1);
    assert_eq!(pending["messages"][0]["text"], "finally");
}

#[tokio::test]
async fn status_reports_counts_and_marks_orchestrator_alive() {
    let (harness, tools) = tools().await;
    harness
        .bridge
        .enqueue_incoming("42", Originator::new("7", "ana"), "hello")
        .await
        .unwrap();

    let status = tools.status().await.unwrap();
    assert_eq!(status["ok"], true);
    assert_eq!(status["status"], "ok");
    assert_eq!(status["counts"]["pending"], 1);
}
