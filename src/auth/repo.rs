use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo_types::{AuthToken, NewAuthToken, Session};
use crate::db::{PgStore, StoreResult};

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` if the token string already exists.
    async fn insert(&self, new: NewAuthToken) -> StoreResult<AuthToken>;
    /// Looks the token up and checks `expires_at > now` in one step.
    async fn find_valid(&self, token: &str, now: OffsetDateTime) -> StoreResult<Option<Session>>;
    async fn delete(&self, token_id: i64) -> StoreResult<bool>;
    async fn purge_expired(&self, now: OffsetDateTime) -> StoreResult<u64>;
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert(&self, new: NewAuthToken) -> StoreResult<AuthToken> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, token, user_id, expires_at
            "#,
        )
        .bind(&new.token)
        .bind(new.user_id)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(token)
    }

    async fn find_valid(&self, token: &str, now: OffsetDateTime) -> StoreResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT t.id AS token_id, t.expires_at,
                   u.id, u.pseudo, u.password_hash, u.is_admin
              FROM auth_tokens t
              JOIN users u ON u.id = t.user_id
             WHERE t.token = $1
               AND t.expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn delete(&self, token_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: OffsetDateTime) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
