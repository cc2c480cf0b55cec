use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{repo_types::Session, services::AuthError};
use crate::{error::AppError, state::AppState, users::repo_types::User};

/// The authenticated caller. Verification runs at most once per request;
/// the session is cached in the request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The raw `Authorization` value. A header that is present but not visible
/// ASCII cannot hold a token, so it is rejected rather than treated as absent.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map(Some).map_err(|_| AuthError::InvalidToken),
        None => Ok(None),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(CurrentUser(session.user.clone()));
        }

        let header = authorization_header(&parts.headers)?;
        let session = state.auth.verify(header).await?;
        let user = session.user.clone();
        parts.extensions.insert(session);
        Ok(CurrentUser(user))
    }
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin
    }

    /// Owner or admin. Rows without an owner are admin-only.
    pub fn ensure_can_modify(&self, owner: Option<i64>) -> Result<(), AppError> {
        if self.is_admin() || owner == Some(self.id()) {
            Ok(())
        } else {
            Err(AppError::forbidden())
        }
    }

    pub fn ensure_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn user(id: i64, is_admin: bool) -> CurrentUser {
        CurrentUser(User {
            id,
            pseudo: format!("user{}", id),
            password_hash: String::new(),
            is_admin,
        })
    }

    #[test]
    fn owner_and_admin_can_modify() {
        assert!(user(1, false).ensure_can_modify(Some(1)).is_ok());
        assert!(user(2, true).ensure_can_modify(Some(1)).is_ok());
        assert!(user(2, false).ensure_can_modify(Some(1)).is_err());
    }

    #[test]
    fn anonymous_rows_are_admin_only() {
        assert!(user(1, false).ensure_can_modify(None).is_err());
        assert!(user(1, true).ensure_can_modify(None).is_ok());
    }

    #[test]
    fn ensure_admin_rejects_regular_users() {
        let err = user(1, false).ensure_admin().unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(user(1, true).ensure_admin().is_ok());
    }

    #[tokio::test]
    async fn cached_session_skips_verification() {
        let state = AppState::fake();
        let (mut parts, _) = Request::builder()
            .header(AUTHORIZATION, "Bearer not-in-any-store")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(Session {
            token_id: 1,
            expires_at: time::OffsetDateTime::now_utc(),
            user: user(5, false).0,
        });

        let current = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current.id(), 5);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::fake();
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Missing authorization token"));
    }

    #[tokio::test]
    async fn non_ascii_header_is_an_invalid_token() {
        let state = AppState::fake();
        let (mut parts, _) = Request::builder()
            .header(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap())
            .body(())
            .unwrap()
            .into_parts();
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Invalid or expired token"));
    }

    #[test]
    fn authorization_header_shapes() {
        let mut headers = HeaderMap::new();
        assert!(matches!(authorization_header(&headers), Ok(None)));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(matches!(authorization_header(&headers), Ok(Some("Bearer abc"))));
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(&[0xff]).unwrap());
        assert!(matches!(authorization_header(&headers), Err(AuthError::InvalidToken)));
    }
}
