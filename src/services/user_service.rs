//! Domain service for account lifecycle: registration, activation, listing,
//! self-service update and deletion, and credential checks for login.

use thiserror::Error;

use crate::db::User;

/// Errors specific to user operations. Authorization (who may act on which
/// account) is enforced at the route layer, not here.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("E-mail delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Invalid activation token")]
    InvalidToken,

    #[error("User not found")]
    NotFound,

    #[error("Incorrect credentials")]
    AuthenticationFailure,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Registration input; fields are already syntax-validated at the boundary.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// One page of active users plus the page count for the whole result set.
#[derive(Debug)]
pub struct UserPage {
    pub content: Vec<User>,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Whether an account already holds this email address.
    async fn is_email_taken(&self, email: &str) -> Result<bool, UserError>;

    /// Create an inactive account and dispatch the activation mail inside one
    /// atomic unit: if the mail cannot be sent, no account row survives.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::EmailDelivery`] when dispatch fails (the insert is
    /// rolled back).
    async fn register(&self, registration: Registration) -> Result<(), UserError>;

    /// Consume an activation token, flipping the account to active. One-shot:
    /// replaying a consumed token fails with [`UserError::InvalidToken`].
    async fn activate(&self, token: &str) -> Result<(), UserError>;

    /// Page through active accounts in insertion order, excluding the
    /// authenticated caller when present.
    async fn list(&self, page: u64, size: u64, exclude: Option<i32>)
    -> Result<UserPage, UserError>;

    /// Fetch one active account; inactive accounts read as missing.
    async fn get(&self, id: i32) -> Result<User, UserError>;

    /// Update the username of the addressed account. Ownership is the
    /// caller's responsibility (route-level authorization policy).
    async fn update(&self, id: i32, username: &str) -> Result<User, UserError>;

    /// Delete the account and all its bearer tokens.
    async fn delete(&self, id: i32) -> Result<(), UserError>;

    /// Check login credentials.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::AuthenticationFailure`] for an unknown email or
    /// wrong password, [`UserError::InactiveAccount`] when the password is
    /// correct but the account was never activated.
    async fn credentials(&self, email: &str, password: &str) -> Result<User, UserError>;
}
