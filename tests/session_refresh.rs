mod common;

use std::time::Duration;

use serde_json::json;
use url_shortener_client::error::FALLBACK_MESSAGE;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{REFRESH_PATH, create_test_client, refresh_succeeds, short_url_json, unauthorized};

async fn mount_protected_urls(server: &MockServer, session: &str) {
    Mock::given(method("GET"))
        .and(path("/api/user/urls"))
        .and(header("cookie", format!("session={session}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "urls": [short_url_json("abc123", "https://example.com", 3, "2024-05-01T08:30:00Z")]
        })))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/user/urls"))
        .respond_with(unauthorized("Access token expired"))
        .with_priority(2)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;
    mount_protected_urls(&server, "fresh").await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(refresh_succeeds("fresh", Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let users = client.users();

    let (a, b, c) = tokio::join!(users.list_urls(), users.list_urls(), users.list_urls());

    for result in [a, b, c] {
        let urls = result.unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].short_id, "abc123");
    }
}

#[tokio::test]
async fn test_refresh_failure_is_shared_by_every_waiter() {
    let server = MockServer::start().await;
    mount_protected_urls(&server, "fresh").await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(unauthorized("Refresh token expired").set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let users = client.users();

    let (a, b, c) = tokio::join!(users.list_urls(), users.list_urls(), users.list_urls());

    let errors: Vec<_> = [a, b, c].into_iter().map(|r| r.unwrap_err()).collect();
    for err in &errors {
        assert!(err.is_session_expired());
        assert_eq!(err.message, "Refresh token expired");
    }
    assert_eq!(errors[0], errors[1]);
    assert_eq!(errors[1], errors[2]);
}

#[tokio::test]
async fn test_replay_rejected_again_expires_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/urls"))
        .respond_with(unauthorized("Unauthorized"))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(refresh_succeeds("fresh", Duration::ZERO))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    let err = client.users().list_urls().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(err.message, "Unauthorized");
}

#[tokio::test]
async fn test_other_errors_do_not_trigger_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/urls"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Database unavailable" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(refresh_succeeds("fresh", Duration::ZERO))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    let err = client.users().list_urls().await.unwrap_err();

    assert!(!err.is_session_expired());
    assert_eq!(err.message, "Database unavailable");
}

#[tokio::test]
async fn test_refresh_without_message_uses_session_expired_text() {
    let server = MockServer::start().await;
    mount_protected_urls(&server, "fresh").await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    let err = client.users().list_urls().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_ne!(err.message, FALLBACK_MESSAGE);
    assert_eq!(err.message, "Session expired, please log in again");
}

#[tokio::test]
async fn test_get_current_user_is_none_when_refresh_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(unauthorized("Not logged in"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(unauthorized("No refresh token"))
        .expect(2)
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    assert_eq!(client.auth().get_current_user().await, Ok(None));
    assert_eq!(client.auth().is_authenticated().await, Ok(false));
}

#[tokio::test]
async fn test_explicit_refreshes_run_one_after_another() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(refresh_succeeds("fresh", Duration::from_millis(50)))
        .expect(2)
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    // Joined while in flight: one request.
    let (a, b) = tokio::join!(client.auth().refresh_session(), client.auth().refresh_session());
    assert!(a.is_ok());
    assert!(b.is_ok());

    // Settled slot: the next refresh goes out again.
    client.auth().refresh_session().await.unwrap();
}
