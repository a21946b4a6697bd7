//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tokio::task;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::token::random_token;
use crate::db::repositories::user::hash_password;
use crate::db::{NewUser, Store, User};
use crate::mail::Mailer;
use crate::services::user_service::{Registration, UserError, UserPage, UserService};

pub struct SeaOrmUserService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, security: SecurityConfig) -> Self {
        Self {
            store,
            mailer,
            security,
        }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn is_email_taken(&self, email: &str) -> Result<bool, UserError> {
        Ok(self.store.users().find_by_email(email).await?.is_some())
    }

    async fn register(&self, registration: Registration) -> Result<(), UserError> {
        let password = registration.password;
        let security = self.security.clone();

        // Argon2 hashing is CPU-intensive; keep it off the async runtime.
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| UserError::Database(format!("Password hashing task panicked: {e}")))??;

        let activation_token = random_token();

        let new = NewUser {
            username: registration.username,
            email: registration.email.clone(),
            password_hash,
            activation_token: activation_token.clone(),
        };

        // The insert and the activation mail form one atomic unit: an
        // inactive account nobody was notified about must never persist.
        let txn = self.store.conn.begin().await?;

        let user = self.store.users().insert(&txn, new).await?;

        if let Err(e) = self
            .mailer
            .send_activation(&registration.email, &activation_token)
            .await
        {
            txn.rollback().await?;
            warn!("Activation mail failed, registration rolled back: {e}");
            return Err(UserError::EmailDelivery(e.to_string()));
        }

        txn.commit().await?;

        info!("Registered user {} ({})", user.id, user.email);
        Ok(())
    }

    async fn activate(&self, token: &str) -> Result<(), UserError> {
        if self.store.users().activate(token).await? {
            Ok(())
        } else {
            Err(UserError::InvalidToken)
        }
    }

    async fn list(
        &self,
        page: u64,
        size: u64,
        exclude: Option<i32>,
    ) -> Result<UserPage, UserError> {
        let (content, total) = self.store.users().list_active(page, size, exclude).await?;

        Ok(UserPage {
            content,
            page,
            size,
            total_pages: total.div_ceil(size),
        })
    }

    async fn get(&self, id: i32) -> Result<User, UserError> {
        self.store
            .users()
            .get_active_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn update(&self, id: i32, username: &str) -> Result<User, UserError> {
        self.store
            .users()
            .update_username(id, username)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn delete(&self, id: i32) -> Result<(), UserError> {
        // The schema cascades tokens on user deletion, but sqlite only honors
        // that with foreign keys enabled; delete both in one transaction.
        let txn = self.store.conn.begin().await?;

        self.store.tokens().delete_for_user(&txn, id).await?;
        let deleted = self.store.users().delete(&txn, id).await?;

        txn.commit().await?;

        if deleted {
            info!("Deleted user {id}");
            Ok(())
        } else {
            Err(UserError::NotFound)
        }
    }

    async fn credentials(&self, email: &str, password: &str) -> Result<User, UserError> {
        let user = self
            .store
            .users()
            .verify_credentials(email, password)
            .await?
            .ok_or(UserError::AuthenticationFailure)?;

        if user.inactive {
            return Err(UserError::InactiveAccount);
        }

        Ok(user)
    }
}
