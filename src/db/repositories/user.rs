use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

/// User data handed out by the repository. The password hash and activation
/// token never cross this boundary.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub inactive: bool,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            inactive: model.inactive,
        }
    }
}

/// Fields for a freshly registered account. Rows always start inactive with
/// the activation token set.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub activation_token: String,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new inactive user. Takes the connection explicitly so the
    /// caller can run it inside a transaction.
    pub async fn insert<C: ConnectionTrait>(&self, conn: &C, new: NewUser) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(new.username),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            inactive: Set(true),
            activation_token: Set(Some(new.activation_token)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(conn).await.context("Failed to insert user")?;
        Ok(User::from(model))
    }

    /// Get an active user by ID; inactive accounts are invisible here.
    pub async fn get_active_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .filter(users::Column::Inactive.eq(false))
            .one(&self.conn)
            .await
            .context("Failed to query active user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Verify credentials by email. Returns the user (active or not) only when
    /// the password matches; the caller decides what inactivity means.
    /// Note: argon2 verification is CPU-intensive and runs in a blocking task.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for credential verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Consume an activation token: flip the matching account to active and
    /// clear the token. Returns false when no account holds the token, which
    /// covers both unknown and already-consumed tokens.
    pub async fn activate(&self, activation_token: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::ActivationToken.eq(activation_token))
            .one(&self.conn)
            .await
            .context("Failed to query user by activation token")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.inactive = Set(false);
        active.activation_token = Set(None);
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Page through active users in insertion order, optionally hiding one
    /// account (the authenticated caller). Returns the rows plus the total
    /// count of matching accounts.
    pub async fn list_active(
        &self,
        page: u64,
        size: u64,
        exclude: Option<i32>,
    ) -> Result<(Vec<User>, u64)> {
        let mut query = users::Entity::find().filter(users::Column::Inactive.eq(false));

        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count active users")?;

        let rows = query
            .order_by_asc(users::Column::Id)
            // page is caller-controlled; a huge value must read as an empty
            // page, not overflow the offset.
            .offset(page.saturating_mul(size))
            .limit(size)
            .all(&self.conn)
            .await
            .context("Failed to list active users")?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    pub async fn update_username(&self, id: i32, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.username = Set(username.to_string());
        active.updated_at = Set(now);
        let updated = active.update(&self.conn).await?;

        Ok(Some(User::from(updated)))
    }

    /// Delete a user row. Takes the connection explicitly so the caller can
    /// pair it with the token cleanup in one transaction.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: i32) -> Result<bool> {
        let result = users::Entity::delete_by_id(id)
            .exec(conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
