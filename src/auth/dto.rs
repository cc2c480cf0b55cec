use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::services::IssuedToken;
use crate::users::repo_types::User;

/// Both fields are optional so a missing one reaches the service as
/// "Missing credentials" instead of a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub pseudo: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub pseudo: String,
    pub is_admin: bool,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            pseudo: user.pseudo,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: PublicUser,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            user: issued.user.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct InvalidTokenResponse {
    pub valid: bool,
    pub message: String,
}
