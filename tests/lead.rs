mod common;

use axum::http::{StatusCode, header::RETRY_AFTER};
use common::{CHAT, TOKEN, app_with, get, notifier, post_json, post_raw, send, spawn_telegram};
use serde_json::{Value, json};
use std::time::Duration;

const SENT: &str = r#"{"ok":true,"result":{"message_id":77,"chat":{"id":-100}}}"#;

fn lead() -> Value {
    json!({
        "name": "Ann",
        "phone": "+1 555 0100",
        "description": "Need a landing page",
        "category": "web",
        "options": ["seo", "copy"],
    })
}

#[tokio::test]
async fn lead_is_forwarded_and_message_id_returned() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;
    let app = app_with(None, notifier(&tg.base, Some(TOKEN), Some(CHAT)), 5, Duration::from_secs(60));

    let (status, _, body) = send(&app, post_json("/lead", &lead(), Some("203.0.113.7, 10.0.0.1"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "messageId": 77 }));

    let calls = tg.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (path, sent) = &calls[0];
    assert_eq!(path, "/botTEST/sendMessage");
    assert_eq!(sent["chat_id"], CHAT);
    assert_eq!(sent["disable_web_page_preview"], true);

    let text = sent["text"].as_str().unwrap();
    assert!(text.contains("Name: Ann"));
    assert!(text.contains("Phone: +1 555 0100"));
    assert!(text.contains("Options: seo, copy"));
    assert!(text.contains("IP: 203.0.113.7"));
}

#[tokio::test]
async fn free_text_is_truncated_to_500_chars() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;
    let app = app_with(None, notifier(&tg.base, Some(TOKEN), Some(CHAT)), 5, Duration::from_secs(60));

    let mut payload = lead();
    payload["description"] = json!("ж".repeat(700));
    let (status, _, _) = send(&app, post_json("/lead", &payload, None)).await;
    assert_eq!(status, StatusCode::OK);

    let calls = tg.calls.lock().unwrap();
    let text = calls[0].1["text"].as_str().unwrap();
    assert!(text.contains(&"ж".repeat(500)));
    assert!(!text.contains(&"ж".repeat(501)));
}

#[tokio::test]
async fn chat_id_in_body_overrides_default() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;
    let app = app_with(None, notifier(&tg.base, Some(TOKEN), None), 5, Duration::from_secs(60));

    let mut payload = lead();
    payload["chatId"] = json!(424242);
    let (status, _, _) = send(&app, post_json("/lead", &payload, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(tg.calls.lock().unwrap()[0].1["chat_id"], "424242");
}

#[tokio::test]
async fn request_over_ceiling_is_rate_limited_per_ip() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;
    let app = app_with(None, notifier(&tg.base, Some(TOKEN), Some(CHAT)), 2, Duration::from_secs(60));

    for _ in 0..2 {
        let (status, _, _) = send(&app, post_json("/lead", &lead(), Some("198.51.100.1"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = send(&app, post_json("/lead", &lead(), Some("198.51.100.1"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
    assert_eq!(body["retryAfterMs"], 60_000);
    assert_eq!(headers[RETRY_AFTER], "60");

    // another client is unaffected
    let (status, _, _) = send(&app, post_json("/lead", &lead(), Some("198.51.100.2"))).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(tg.calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn rate_limit_runs_before_body_validation() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;
    let app = app_with(None, notifier(&tg.base, Some(TOKEN), Some(CHAT)), 1, Duration::from_secs(60));

    let (status, _, body) =
        send(&app, post_raw("/lead", "application/json", "{oops", Some("192.0.2.9"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");

    let (status, _, body) = send(&app, post_json("/lead", &lead(), Some("192.0.2.9"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");

    assert!(tg.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn window_expiry_lets_the_client_back_in() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;
    let app = app_with(None, notifier(&tg.base, Some(TOKEN), Some(CHAT)), 1, Duration::from_millis(200));

    let (status, _, _) = send(&app, post_json("/lead", &lead(), Some("192.0.2.1"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, post_json("/lead", &lead(), Some("192.0.2.1"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(250)).await;

    let (status, _, _) = send(&app, post_json("/lead", &lead(), Some("192.0.2.1"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn required_fields_are_checked() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;
    let app = app_with(None, notifier(&tg.base, Some(TOKEN), Some(CHAT)), 10, Duration::from_secs(60));

    let (status, _, body) = send(&app, post_json("/lead", &json!({ "phone": "1" }), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name_required");

    let (status, _, body) = send(&app, post_json("/lead", &json!({ "name": "Ann" }), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "phone_required");

    assert!(tg.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failures_are_bad_gateway() {
    let replies = [
        (StatusCode::INTERNAL_SERVER_ERROR, r#"{"ok":false}"#),
        (StatusCode::OK, "<html>not json</html>"),
        (StatusCode::OK, r#"{"ok":false,"description":"Bad Request: chat not found"}"#),
        (StatusCode::OK, r#"{"ok":true}"#),
    ];

    for (reply_status, reply_body) in replies {
        let tg = spawn_telegram(reply_status, reply_body).await;
        let app = app_with(None, notifier(&tg.base, Some(TOKEN), Some(CHAT)), 5, Duration::from_secs(60));

        let (status, _, body) = send(&app, post_json("/lead", &lead(), None)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY, "{reply_body}");
        assert_eq!(body["error"], "notifier_failed", "{reply_body}");
        assert_eq!(tg.calls.lock().unwrap().len(), 1, "no retries");
    }
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let app = app_with(None, notifier("http://127.0.0.1:9", Some(TOKEN), Some(CHAT)), 5, Duration::from_secs(60));

    let (status, _, body) = send(&app, post_json("/lead", &lead(), None)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "notifier_failed");
}

#[tokio::test]
async fn missing_credentials_are_reported() {
    let tg = spawn_telegram(StatusCode::OK, SENT).await;

    let app = app_with(None, notifier(&tg.base, None, Some(CHAT)), 5, Duration::from_secs(60));
    let (status, _, body) = send(&app, post_json("/lead", &lead(), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "notifier_not_configured");

    let app = app_with(None, notifier(&tg.base, Some(TOKEN), None), 5, Duration::from_secs(60));
    let (status, _, body) = send(&app, post_json("/lead", &lead(), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "notifier_not_configured");

    assert!(tg.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn ping_reports_configuration_without_secrets() {
    let app = app_with(None, notifier("http://127.0.0.1:9", Some(TOKEN), None), 5, Duration::from_secs(60));

    let (status, _, body) = send(&app, get("/lead/ping")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "ok": false, "tokenConfigured": true, "chatConfigured": false })
    );
    assert!(!body.to_string().contains(TOKEN));
}
