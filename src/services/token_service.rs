//! Domain service for opaque bearer tokens.
//!
//! Tokens are store-backed rather than signed so revocation takes effect
//! immediately, at the cost of one store round trip per authenticated request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for TokenError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Identity resolved from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Issue a fresh opaque token bound to the user and return it.
    async fn issue(&self, user_id: i32) -> Result<String, TokenError>;

    /// Resolve a token to its owner. Unknown tokens and tokens whose owner is
    /// inactive resolve to `None`; only store failures are errors.
    async fn verify(&self, token: &str) -> Result<Option<AuthenticatedUser>, TokenError>;

    /// Delete a token. Revoking an unknown token is a no-op.
    async fn revoke(&self, token: &str) -> Result<(), TokenError>;
}
