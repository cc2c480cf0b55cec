use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{InvalidTokenResponse, LoginRequest, LoginResponse, VerifyResponse},
    extractors::authorization_header,
    services::AuthError,
};
use crate::{
    error::{AppError, AppResult},
    extract::ApiJson,
    response::MessageResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/verify", get(verify))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let issued = state
        .auth
        .login(payload.pseudo.as_deref(), payload.password.as_deref())
        .await?;
    Ok(Json(issued.into()))
}

#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<MessageResponse>> {
    state.auth.logout(authorization_header(&headers)?).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

#[instrument(skip(state, headers))]
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let result = match authorization_header(&headers) {
        Ok(header) => state.auth.verify(header).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(session) => Json(VerifyResponse {
            valid: true,
            user: session.user.into(),
        })
        .into_response(),
        Err(err @ (AuthError::MissingToken | AuthError::InvalidToken)) => (
            StatusCode::UNAUTHORIZED,
            Json(InvalidTokenResponse {
                valid: false,
                message: err.to_string(),
            }),
        )
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
