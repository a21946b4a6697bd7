mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{body_json, json_request, login, register_active_user, spawn_app};
use tower::ServiceExt;

fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

#[tokio::test]
async fn test_update_requires_authentication() {
    let (app, mailer) = spawn_app().await;
    register_active_user(&app, &mailer, "user1", "user1@mail.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/users/1",
            &serde_json::json!({ "username": "renamed" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "You are not authorized to update user");
}

#[tokio::test]
async fn test_update_rejects_other_users_token() {
    let (app, mailer) = spawn_app().await;
    register_active_user(&app, &mailer, "user1", "user1@mail.com").await;
    register_active_user(&app, &mailer, "user2", "user2@mail.com").await;

    let (_, token) = login(&app, "user2@mail.com", "P4ssword").await;
    let (victim_id, _) = login(&app, "user1@mail.com", "P4ssword").await;

    let request = with_bearer(
        json_request(
            "PUT",
            &format!("/api/v1/users/{victim_id}"),
            &serde_json::json!({ "username": "hijacked" }),
        ),
        &token,
    );

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owner_can_update_username() {
    let (app, mailer) = spawn_app().await;
    register_active_user(&app, &mailer, "user1", "user1@mail.com").await;

    let (id, token) = login(&app, "user1@mail.com", "P4ssword").await;

    let request = with_bearer(
        json_request(
            "PUT",
            &format!("/api/v1/users/{id}"),
            &serde_json::json!({ "username": "renamed" }),
        ),
        &token,
    );

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "renamed");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/users/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["username"], "renamed");
}

#[tokio::test]
async fn test_update_validates_new_username() {
    let (app, mailer) = spawn_app().await;
    register_active_user(&app, &mailer, "user1", "user1@mail.com").await;

    let (id, token) = login(&app, "user1@mail.com", "P4ssword").await;

    for (payload, expected) in [
        (serde_json::json!({}), "Cannot be null"),
        (
            serde_json::json!({ "username": "abc" }),
            "Must have min 4 and max 32 characters",
        ),
    ] {
        let request = with_bearer(
            json_request("PUT", &format!("/api/v1/users/{id}"), &payload),
            &token,
        );

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["validationErrors"]["username"], expected);
    }
}

#[tokio::test]
async fn test_delete_requires_ownership() {
    let (app, mailer) = spawn_app().await;
    register_active_user(&app, &mailer, "user1", "user1@mail.com").await;
    register_active_user(&app, &mailer, "user2", "user2@mail.com").await;

    let (victim_id, _) = login(&app, "user1@mail.com", "P4ssword").await;
    let (_, token) = login(&app, "user2@mail.com", "P4ssword").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/users/{victim_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "You are not authorized to delete user");

    let response = app
        .clone()
        .oneshot(with_bearer(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/users/{victim_id}"))
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_activate_login_delete_flow() {
    let (app, mailer) = spawn_app().await;
    register_active_user(&app, &mailer, "user1", "user1@mail.com").await;

    let (id, token) = login(&app, "user1@mail.com", "P4ssword").await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/users/{id}"))
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User is deleted");

    // The account is gone from reads and the listing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/users/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 0);

    // Tokens died with the account.
    let request = with_bearer(
        json_request(
            "PUT",
            &format!("/api/v1/users/{id}"),
            &serde_json::json!({ "username": "ghost" }),
        ),
        &token,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The freed email registers again.
    let status = common::register_user(&app, "user1", "user1@mail.com").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_revokes_every_session() {
    let (app, mailer) = spawn_app().await;
    register_active_user(&app, &mailer, "user1", "user1@mail.com").await;
    register_active_user(&app, &mailer, "user2", "user2@mail.com").await;

    let (id, token) = login(&app, "user1@mail.com", "P4ssword").await;

    // Two sessions for the same account; deleting through one kills both.
    let (_, second_token) = login(&app, "user1@mail.com", "P4ssword").await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/users/{id}"))
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = with_bearer(
        json_request(
            "PUT",
            &format!("/api/v1/users/{id}"),
            &serde_json::json!({ "username": "ghost" }),
        ),
        &second_token,
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
