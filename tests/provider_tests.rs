//! HTTP-level tests for the Mandrill client against a mock server.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bouncewatch::config::ProviderConfig;
use bouncewatch::error::BounceWatchError;
use bouncewatch::model::ResendPayload;
use bouncewatch::provider::{MandrillClient, ProviderClient, SearchWindow};

const KEY: &str = "test-key";

fn client_for(server: &MockServer) -> MandrillClient {
    let cfg = ProviderConfig {
        api_key: Some(KEY.to_string()),
        base_url: format!("{}/api/1.0/", server.uri()),
        timeout_secs: 5,
    };
    MandrillClient::new(&cfg).expect("client")
}

fn window() -> SearchWindow {
    SearchWindow::ending(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(), 7, 20)
}

#[tokio::test]
async fn test_search_sends_key_and_window() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.0/messages/search.json"))
        .and(body_partial_json(json!({
            "key": KEY,
            "query": "jane@example.com",
            "date_from": "2024-06-01",
            "limit": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "1", "email": "jane@example.com", "state": "sent", "ts": 1717200000, "opens": 1 },
            { "_id": "2", "email": "jane@example.com", "state": "soft-bounced", "diag": "mailbox full" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let records = client_for(&server)
        .search_messages("jane@example.com", &window())
        .await
        .expect("search");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[1].diagnostic, "mailbox full");
}

#[tokio::test]
async fn test_search_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.0/messages/search.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Key",
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search_messages("jane@example.com", &window())
        .await
        .expect_err("should fail");
    match err {
        BounceWatchError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Invalid_Key: Invalid API key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_search_non_array_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.0/messages/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search_messages("x", &window())
        .await
        .expect_err("should fail");
    assert!(matches!(err, BounceWatchError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    let cfg = ProviderConfig {
        api_key: Some(KEY.into()),
        base_url: "http://127.0.0.1:1".into(),
        timeout_secs: 2,
    };
    let err = MandrillClient::new(&cfg)
        .expect("client")
        .delete_from_deny_list("a@b.com")
        .await
        .expect_err("should fail");
    assert!(matches!(err, BounceWatchError::Transport(_)));
}

#[tokio::test]
async fn test_delete_from_deny_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.0/rejects/delete.json"))
        .and(body_partial_json(json!({ "key": KEY, "email": "jane@example.com" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "email": "jane@example.com", "deleted": true })),
        )
        .mount(&server)
        .await;

    let removed = client_for(&server)
        .delete_from_deny_list("jane@example.com")
        .await
        .expect("delete");
    assert!(removed);
}

#[tokio::test]
async fn test_fetch_message_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.0/messages/content.json"))
        .and(body_partial_json(json!({ "id": "abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subject": "Activate your store",
            "from_email": "hello@shop.example",
            "from_name": "Shop",
            "to": { "email": "merchant@example.com", "name": "" },
            "html": "<p>Activate</p>"
        })))
        .mount(&server)
        .await;

    let detail = client_for(&server)
        .fetch_message_info("abc")
        .await
        .expect("content");
    assert_eq!(detail.id, "abc");
    assert_eq!(detail.to_email, "merchant@example.com");
    assert_eq!(detail.to_name, None);
    assert_eq!(detail.html.as_deref(), Some("<p>Activate</p>"));
}

#[tokio::test]
async fn test_fetch_message_info_rejects_empty_id() {
    let server = MockServer::start().await;
    let err = client_for(&server)
        .fetch_message_info("  ")
        .await
        .expect_err("should fail");
    assert!(matches!(err, BounceWatchError::InvalidInput(_)));
}

fn payload() -> ResendPayload {
    ResendPayload {
        html: Some("<p>Activate</p>".into()),
        text: None,
        subject: "Activate your store".into(),
        from_email: "hello@shop.example".into(),
        from_name: Some("Shop".into()),
        to_email: "merchant@example.com".into(),
    }
}

#[tokio::test]
async fn test_resend_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.0/messages/send.json"))
        .and(body_partial_json(json!({
            "message": {
                "subject": "Activate your store",
                "to": [{ "email": "merchant@example.com", "type": "to" }]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "email": "merchant@example.com", "status": "queued", "_id": "n1" }
        ])))
        .mount(&server)
        .await;

    assert!(client_for(&server).resend(&payload()).await.expect("send"));
}

#[tokio::test]
async fn test_resend_rejected_recipient_is_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/1.0/messages/send.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "email": "merchant@example.com", "status": "rejected", "reject_reason": "hard-bounce" }
        ])))
        .mount(&server)
        .await;

    assert!(!client_for(&server).resend(&payload()).await.expect("send"));
}
