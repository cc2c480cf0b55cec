use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{
    password::verify_password,
    repo::TokenStore,
    repo_types::{NewAuthToken, Session},
    token::{generate_token, parse_bearer},
};
use crate::{
    db::StoreError,
    users::{repo::UserRepo, repo_types::User},
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authorization token")]
    MissingToken,

    /// Unknown, expired and malformed tokens all look the same to the caller.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token collision, please retry")]
    TokenCollision,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A freshly minted token together with its owner.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub user: User,
}

/// Issues, verifies and revokes opaque bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    tokens: Arc<dyn TokenStore>,
    ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, tokens: Arc<dyn TokenStore>, ttl_minutes: i64) -> Self {
        Self {
            users,
            tokens,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub async fn login(
        &self,
        pseudo: Option<&str>,
        password: Option<&str>,
    ) -> Result<IssuedToken, AuthError> {
        let (pseudo, password) = match (pseudo, password) {
            (Some(p), Some(pw)) if !p.is_empty() && !pw.is_empty() => (p, pw),
            _ => return Err(AuthError::MissingCredentials),
        };

        let user = match self.users.find_by_pseudo(pseudo).await? {
            Some(u) => u,
            None => {
                warn!(pseudo = %pseudo, "login unknown pseudo");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        self.purge_expired().await?;

        let issued_at = OffsetDateTime::now_utc();
        let expires_at = issued_at + self.ttl;
        let token = generate_token();
        let new = NewAuthToken {
            token: token.clone(),
            user_id: user.id,
            expires_at,
        };
        match self.tokens.insert(new).await {
            Ok(_) => {}
            Err(StoreError::Duplicate(_)) => {
                error!(user_id = user.id, "generated token already exists");
                return Err(AuthError::TokenCollision);
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = user.id, "user logged in");
        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
            user,
        })
    }

    /// Resolves an `Authorization` header value to a live session.
    pub async fn verify(&self, header: Option<&str>) -> Result<Session, AuthError> {
        let header = header.ok_or(AuthError::MissingToken)?;
        let token = parse_bearer(header).ok_or(AuthError::InvalidToken)?;
        let session = self
            .tokens
            .find_valid(token, OffsetDateTime::now_utc())
            .await?
            .ok_or(AuthError::InvalidToken)?;
        debug!(user_id = session.user.id, "token verified");
        Ok(session)
    }

    pub async fn logout(&self, header: Option<&str>) -> Result<(), AuthError> {
        let session = self.verify(header).await?;
        // lost a race with another logout or a purge
        if !self.tokens.delete(session.token_id).await? {
            return Err(AuthError::InvalidToken);
        }
        info!(user_id = session.user.id, "user logged out");
        Ok(())
    }

    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let purged = self.tokens.purge_expired(OffsetDateTime::now_utc()).await?;
        if purged > 0 {
            debug!(purged, "expired tokens purged");
        }
        Ok(purged)
    }

    /// Runs `purge_expired` every `interval` until the runtime shuts down.
    pub fn spawn_purge_task(&self, interval: std::time::Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = service.purge_expired().await {
                    warn!(error = %e, "scheduled token purge failed");
                }
            }
        })
    }
}
