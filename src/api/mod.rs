use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::mail::{Mailer, SmtpMailer};
use crate::services::{
    SeaOrmTokenService, SeaOrmUserService, TokenService, UserService,
};

pub mod auth;
mod error;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub user_service: Arc<dyn UserService>,

    pub token_service: Arc<dyn TokenService>,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    create_app_state_with_mailer(config, mailer).await
}

/// Same as [`create_app_state`] but with the mail transport injected, so tests
/// can observe dispatches without a live SMTP server.
pub async fn create_app_state_with_mailer(
    config: Config,
    mailer: Arc<dyn Mailer>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    let user_service = Arc::new(SeaOrmUserService::new(
        store.clone(),
        mailer,
        config.security.clone(),
    )) as Arc<dyn UserService>;

    let token_service = Arc::new(SeaOrmTokenService::new(store)) as Arc<dyn TokenService>;

    Ok(Arc::new(AppState {
        config,
        user_service,
        token_service,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/token/{token}", post(users::activate))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/auth", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api/v1", api_router)
        .layer(middleware::from_fn(error::localize_errors))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
