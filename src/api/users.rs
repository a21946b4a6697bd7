//! Handlers for registration, activation, listing, and self-service account
//! management.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use crate::api::AppState;
use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::api::types::{
    CreateUserRequest, MessageResponse, PageQuery, UserPageResponse, UserResponse,
    UserUpdateRequest,
};
use crate::api::validation;
use crate::i18n::{self, Lang};
use crate::services::Registration;

/// POST /api/v1/users
///
/// All field failures are collected into one response so the client sees the
/// complete picture in a single round trip.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let username = payload.username.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let mut errors = Vec::new();

    if let Some(key) = validation::validate_username(&username) {
        errors.push(("username", key));
    }

    match validation::validate_email(&email) {
        Some(key) => errors.push(("email", key)),
        None => {
            // Uniqueness is only worth checking for a syntactically valid
            // address.
            if state.user_service.is_email_taken(&email).await? {
                errors.push(("email", "been_taken"));
            }
        }
    }

    if let Some(key) = validation::validate_password(&password) {
        errors.push(("password", key));
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    state
        .user_service
        .register(Registration {
            username,
            email,
            password,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: i18n::translate(lang, "user_created").to_string(),
    }))
}

/// POST /api/v1/users/token/{token}
pub async fn activate(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.activate(&token).await?;

    Ok(Json(MessageResponse {
        message: i18n::translate(lang, "account_activation_success").to_string(),
    }))
}

/// GET /api/v1/users
///
/// The authenticated caller, when present, is excluded from their own listing.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Result<Json<UserPageResponse>, ApiError> {
    let page = state
        .user_service
        .list(query.page(), query.size(), caller)
        .await?;

    Ok(Json(UserPageResponse {
        content: page.content.into_iter().map(UserResponse::from).collect(),
        page: page.page,
        size: page.size,
        total_pages: page.total_pages,
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/v1/users/{id}
///
/// Only the account owner may update; anyone else gets 403 before the body is
/// even validated.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if caller != Some(id) {
        return Err(ApiError::ForbiddenUpdate);
    }

    let username = payload.username.unwrap_or_default();
    if let Some(key) = validation::validate_username(&username) {
        return Err(ApiError::Validation(vec![("username", key)]));
    }

    let user = state.user_service.update(id, &username).await?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    lang: Lang,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Result<Json<MessageResponse>, ApiError> {
    if caller != Some(id) {
        return Err(ApiError::ForbiddenDelete);
    }

    state.user_service.delete(id).await?;

    Ok(Json(MessageResponse {
        message: i18n::translate(lang, "user_delete_success").to_string(),
    }))
}
