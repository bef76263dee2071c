#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use url_shortener_client::ApiClient;
use url_shortener_client::config::ClientConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const CSRF_PATH: &str = "/api/auth/csrf-token";
pub const REFRESH_PATH: &str = "/api/auth/refresh-token";

pub fn create_test_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_url: format!("{}/api", server.uri()),
        timeout_secs: 5,
        ..ClientConfig::default()
    }
}

pub fn create_test_client(server: &MockServer) -> ApiClient {
    ApiClient::new(&create_test_config(server)).unwrap()
}

/// Serves the same CSRF token on every fetch.
pub async fn mount_csrf_token(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path(CSRF_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "csrfToken": token })))
        .mount(server)
        .await;
}

/// Hands out `token-1`, `token-2`, ... one per fetch.
#[derive(Default)]
pub struct SequentialTokens {
    issued: AtomicUsize,
}

impl Respond for SequentialTokens {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(json!({ "csrfToken": format!("token-{n}") }))
    }
}

/// Successful refresh that rotates the session cookie to `session`.
pub fn refresh_succeeds(session: &str, delay: Duration) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("set-cookie", format!("session={session}; Path=/; HttpOnly").as_str())
        .set_body_json(json!({}))
        .set_delay(delay)
}

pub fn unauthorized(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "message": message }))
}

pub fn user_json(id: &str, name: &str, email: &str) -> Value {
    json!({ "_id": id, "name": name, "email": email })
}

pub fn short_url_json(short_id: &str, redirect_url: &str, visits: u64, created_at: &str) -> Value {
    json!({
        "shortId": short_id,
        "redirectURL": redirect_url,
        "createdBy": "u1",
        "createdAt": created_at,
        "visitCount": visits
    })
}
