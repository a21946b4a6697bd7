use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

use crate::entities::{tokens, users};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, token: &str, user_id: i32) -> Result<()> {
        let active = tokens::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert token")?;

        Ok(())
    }

    /// Look up a token together with its owning user in one round trip.
    pub async fn find_with_user(
        &self,
        token: &str,
    ) -> Result<Option<(tokens::Model, users::Model)>> {
        let row = tokens::Entity::find_by_id(token)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query token")?;

        Ok(row.and_then(|(t, u)| u.map(|u| (t, u))))
    }

    /// Delete a token row. Unknown tokens are a no-op.
    pub async fn delete(&self, token: &str) -> Result<()> {
        tokens::Entity::delete_by_id(token)
            .exec(&self.conn)
            .await
            .context("Failed to delete token")?;

        Ok(())
    }

    /// Delete every token owned by a user. Takes the connection explicitly so
    /// user deletion can run it in the same transaction.
    pub async fn delete_for_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
    ) -> Result<u64> {
        let result = tokens::Entity::delete_many()
            .filter(tokens::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .context("Failed to delete tokens for user")?;

        Ok(result.rows_affected)
    }
}

/// Generate a random opaque token (64 character hex string, 32 bytes of
/// entropy). Used for both bearer and activation tokens.
#[must_use]
pub fn random_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
