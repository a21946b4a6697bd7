//! `SeaORM` implementation of the `TokenService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::db::repositories::token::random_token;
use crate::services::token_service::{AuthenticatedUser, TokenError, TokenService};

pub struct SeaOrmTokenService {
    store: Store,
}

impl SeaOrmTokenService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenService for SeaOrmTokenService {
    async fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        let token = random_token();
        self.store.tokens().insert(&token, user_id).await?;
        Ok(token)
    }

    async fn verify(&self, token: &str) -> Result<Option<AuthenticatedUser>, TokenError> {
        let row = self.store.tokens().find_with_user(token).await?;

        // A token whose owner has gone inactive no longer authenticates.
        Ok(row
            .filter(|(_, user)| !user.inactive)
            .map(|(_, user)| AuthenticatedUser { id: user.id }))
    }

    async fn revoke(&self, token: &str) -> Result<(), TokenError> {
        self.store.tokens().delete(token).await?;
        Ok(())
    }
}
