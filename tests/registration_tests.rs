mod common;

use axum::http::StatusCode;
use common::{body_json, json_request, register_user, spawn_app};
use tower::ServiceExt;

fn valid_payload() -> serde_json::Value {
    serde_json::json!({
        "username": "user1",
        "email": "user1@mail.com",
        "password": "P4ssword",
    })
}

#[tokio::test]
async fn test_register_returns_success_message() {
    let (app, mailer) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/users", &valid_payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "User created");

    assert_eq!(mailer.sent_count(), 1);
    assert_eq!(mailer.last_recipient().as_deref(), Some("user1@mail.com"));
    assert_eq!(mailer.last_token().unwrap().len(), 64);
}

#[tokio::test]
async fn test_register_message_in_turkish() {
    let (app, _mailer) = spawn_app().await;

    let mut request = json_request("POST", "/api/v1/users", &valid_payload());
    request
        .headers_mut()
        .insert("Accept-Language", "tr".parse().unwrap());

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Kullanıcı oluşturuldu");
}

#[tokio::test]
async fn test_registered_user_is_inactive_until_activated() {
    let (app, _mailer) = spawn_app().await;

    register_user(&app, "user1", "user1@mail.com").await;

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/api/v1/users")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_register_missing_fields_reports_all_as_blank() {
    let (app, _mailer) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/users", &serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Validation Failure");
    assert_eq!(body["path"], "/api/v1/users");
    assert!(body["timestamp"].as_i64().unwrap() > 0);

    let errors = &body["validationErrors"];
    assert_eq!(errors["username"], "Cannot be null");
    assert_eq!(errors["email"], "Cannot be null");
    assert_eq!(errors["password"], "Cannot be null");
}

#[tokio::test]
async fn test_register_field_rules() {
    let (app, _mailer) = spawn_app().await;

    let cases = [
        (
            serde_json::json!({"username": "usr", "email": "user1@mail.com", "password": "P4ssword"}),
            "username",
            "Must have min 4 and max 32 characters",
        ),
        (
            serde_json::json!({"username": "a".repeat(33), "email": "user1@mail.com", "password": "P4ssword"}),
            "username",
            "Must have min 4 and max 32 characters",
        ),
        (
            serde_json::json!({"username": "user1", "email": "mail.com", "password": "P4ssword"}),
            "email",
            "E-mail is not valid",
        ),
        (
            serde_json::json!({"username": "user1", "email": "user1@mail.com", "password": "P4ss"}),
            "password",
            "Password must be at least 6 characters",
        ),
        (
            serde_json::json!({"username": "user1", "email": "user1@mail.com", "password": "alllowercase"}),
            "password",
            "Password must have at least 1 uppercase, 1 lowercase letter and 1 number",
        ),
    ];

    for (payload, field, expected) in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/users", &payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["validationErrors"][field], expected, "field: {field}");
    }
}

#[tokio::test]
async fn test_register_duplicate_email_rejected() {
    let (app, _mailer) = spawn_app().await;

    register_user(&app, "user1", "user1@mail.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            &serde_json::json!({
                "username": "otheruser",
                "email": "user1@mail.com",
                "password": "P4ssword",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["validationErrors"]["email"], "E-mail in use");
}

#[tokio::test]
async fn test_register_validation_errors_in_turkish() {
    let (app, _mailer) = spawn_app().await;

    let mut request = json_request("POST", "/api/v1/users", &serde_json::json!({}));
    request
        .headers_mut()
        .insert("Accept-Language", "tr-TR".parse().unwrap());

    let response = app.clone().oneshot(request).await.unwrap();

    let body = body_json(response).await;
    assert_eq!(body["message"], "Doğrulama Hatası");
    assert_eq!(body["validationErrors"]["username"], "Boş olamaz");
}

#[tokio::test]
async fn test_register_rolls_back_when_mail_fails() {
    let (app, mailer) = spawn_app().await;

    mailer.set_failing(true);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/users", &valid_payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["message"], "E-mail Failure");

    // The insert was rolled back, so the same address registers cleanly once
    // the relay recovers.
    mailer.set_failing(false);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/users", &valid_payload()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
