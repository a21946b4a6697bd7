#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use signet::Config;
use signet::api;
use signet::mail::{MailError, Mailer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Mail double that records dispatches instead of talking SMTP. Flip
/// `set_failing` to simulate an unreachable relay.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_recipient(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(to, _)| to.clone())
    }

    pub fn last_token(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_activation(&self, email: &str, token: &str) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".to_string()));
        }

        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}

pub async fn spawn_app() -> (Router, Arc<RecordingMailer>) {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    // One pooled connection, or every checkout would see a fresh in-memory db.
    config.database.max_connections = 1;
    config.database.min_connections = 1;
    // Cheap hashing parameters to keep the suite fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let mailer = Arc::new(RecordingMailer::default());

    let state = api::create_app_state_with_mailer(config, mailer.clone())
        .await
        .expect("Failed to create app state");

    (api::router(state), mailer)
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user with the standard test password `P4ssword`.
pub async fn register_user(app: &Router, username: &str, email: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            &serde_json::json!({
                "username": username,
                "email": email,
                "password": "P4ssword",
            }),
        ))
        .await
        .unwrap();

    response.status()
}

/// Register and immediately activate via the token captured by the mailer.
pub async fn register_active_user(
    app: &Router,
    mailer: &RecordingMailer,
    username: &str,
    email: &str,
) {
    let status = register_user(app, username, email).await;
    assert_eq!(status, StatusCode::OK);

    let token = mailer.last_token().expect("No activation mail recorded");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/users/token/{token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// Log in and return `(id, token)`.
pub async fn login(app: &Router, email: &str, password: &str) -> (i64, String) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth",
            &serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    (
        body["id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}
