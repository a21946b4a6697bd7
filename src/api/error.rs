use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::i18n::{self, Lang};
use crate::services::{TokenError, UserError};

#[derive(Debug)]
pub enum ApiError {
    /// One message key per offending field, reported together.
    Validation(Vec<(&'static str, &'static str)>),

    InvalidToken,

    NotFound,

    ForbiddenUpdate,

    ForbiddenDelete,

    AuthenticationFailure,

    InactiveAccount,

    EmailFailure(String),

    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => write!(f, "Validation failure: {} field(s)", errors.len()),
            ApiError::InvalidToken => write!(f, "Invalid activation token"),
            ApiError::NotFound => write!(f, "User not found"),
            ApiError::ForbiddenUpdate => write!(f, "Not authorized to update user"),
            ApiError::ForbiddenDelete => write!(f, "Not authorized to delete user"),
            ApiError::AuthenticationFailure => write!(f, "Incorrect credentials"),
            ApiError::InactiveAccount => write!(f, "Account is inactive"),
            ApiError::EmailFailure(msg) => write!(f, "E-mail failure: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Untranslated error payload attached to the response as an extension; the
/// [`localize_errors`] middleware turns it into the wire body.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message_key: &'static str,
    pub validation_errors: Option<Vec<(&'static str, &'static str)>>,
}

impl ErrorDetail {
    const fn simple(message_key: &'static str) -> Self {
        Self {
            message_key,
            validation_errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    message_key: "validation_failure",
                    validation_errors: Some(errors),
                },
            ),
            ApiError::InvalidToken => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::simple("account_activation_failure"),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorDetail::simple("user_not_found"),
            ),
            ApiError::ForbiddenUpdate => (
                StatusCode::FORBIDDEN,
                ErrorDetail::simple("unauthorized_user_update"),
            ),
            ApiError::ForbiddenDelete => (
                StatusCode::FORBIDDEN,
                ErrorDetail::simple("unauthorized_user_delete"),
            ),
            ApiError::AuthenticationFailure => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::simple("authentication_failure"),
            ),
            ApiError::InactiveAccount => (
                StatusCode::FORBIDDEN,
                ErrorDetail::simple("inactive_authentication_failure"),
            ),
            ApiError::EmailFailure(msg) => {
                tracing::warn!("Activation mail dispatch failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorDetail::simple("email_failure"),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorDetail::simple("internal_failure"),
                )
            }
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailDelivery(msg) => Self::EmailFailure(msg),
            UserError::InvalidToken => Self::InvalidToken,
            UserError::NotFound => Self::NotFound,
            UserError::AuthenticationFailure => Self::AuthenticationFailure,
            UserError::InactiveAccount => Self::InactiveAccount,
            UserError::Database(msg) => Self::Internal(msg),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Database(msg) => Self::Internal(msg),
        }
    }
}

/// Uniform error body: `{path, timestamp, message}` plus `validationErrors`
/// for field failures. Messages are translated into the negotiated language.
#[derive(Debug, Serialize)]
struct ErrorBody {
    path: String,
    timestamp: i64,
    message: String,
    #[serde(rename = "validationErrors", skip_serializing_if = "Option::is_none")]
    validation_errors: Option<BTreeMap<String, String>>,
}

/// Outermost middleware: rewrites any response carrying an [`ErrorDetail`]
/// into the localized error body, keeping the status code.
pub async fn localize_errors(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let lang = Lang::negotiate(request.headers());

    let response = next.run(request).await;

    let Some(detail) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let body = ErrorBody {
        path,
        timestamp: chrono::Utc::now().timestamp_millis(),
        message: i18n::translate(lang, detail.message_key).to_string(),
        validation_errors: detail.validation_errors.map(|errors| {
            errors
                .into_iter()
                .map(|(field, key)| (field.to_string(), i18n::translate(lang, key).to_string()))
                .collect()
        }),
    };

    (response.status(), Json(body)).into_response()
}
