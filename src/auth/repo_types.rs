use sqlx::FromRow;
use time::OffsetDateTime;

use crate::users::repo_types::User;

/// Persisted bearer token.
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

impl AuthToken {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct NewAuthToken {
    pub token: String,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

/// A non-expired token row joined with its owner.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token_id: i64,
    pub expires_at: OffsetDateTime,
    #[sqlx(flatten)]
    pub user: User,
}
