use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, UpdateUserRequest, UserView},
    repo_types::{NewUser, UserChanges},
};
use crate::{
    auth::password::hash_password,
    db::StoreError,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath},
    response::{DataResponse, ListResponse, MessageResponse},
    state::AppState,
    validate::check_length,
};

const PSEUDO_MAX: usize = 50;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).delete(delete_all_users))
        .route("/users/:id", patch(update_user).delete(delete_user))
}

fn pseudo_conflict(err: StoreError) -> AppError {
    match err {
        StoreError::Duplicate(_) => AppError::Conflict("Pseudo already exists".into()),
        other => other.into(),
    }
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<ListResponse<UserView>>> {
    let users = state.users.list().await?;
    Ok(Json(ListResponse::new(users.into_iter().map(UserView::from).collect())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<UserView>> {
    let profile = state
        .users
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(profile.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserView>>)> {
    let (pseudo, password) = match (payload.pseudo, payload.password) {
        (Some(p), Some(pw)) if !p.is_empty() && !pw.is_empty() => (p, pw),
        _ => return Err(AppError::BadRequest("Pseudo and password are required".into())),
    };
    check_length("pseudo", &pseudo, PSEUDO_MAX)?;

    let is_admin = payload.is_admin.unwrap_or(false);
    if is_admin {
        warn!(pseudo = %pseudo, "admin account created through the open users endpoint");
    }

    let user = state
        .users
        .create(NewUser {
            pseudo,
            password_hash: hash_password(&password)?,
            is_admin,
        })
        .await
        .map_err(pseudo_conflict)?;

    info!(user_id = user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("User created successfully", user.into())),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserView>>> {
    if let Some(pseudo) = &payload.pseudo {
        check_length("pseudo", pseudo, PSEUDO_MAX)?;
    }
    let password_hash = match payload.password.as_deref() {
        Some(pw) if !pw.is_empty() => Some(hash_password(pw)?),
        Some(_) => return Err(AppError::BadRequest("password must not be empty".into())),
        None => None,
    };
    if payload.is_admin == Some(true) {
        warn!(user_id = id, "admin flag granted through the open users endpoint");
    }

    let changes = UserChanges {
        pseudo: payload.pseudo,
        password_hash,
        is_admin: payload.is_admin,
    };
    let profile = state
        .users
        .update(id, changes)
        .await
        .map_err(pseudo_conflict)?
        .ok_or_else(|| AppError::not_found("User"))?;

    info!(user_id = id, "user updated");
    Ok(Json(DataResponse::new("User updated successfully", profile.into())))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    if !state.users.delete(id).await? {
        return Err(AppError::not_found("User"));
    }
    info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[instrument(skip(state))]
pub async fn delete_all_users(State(state): State<AppState>) -> AppResult<Json<MessageResponse>> {
    let deleted = state.users.delete_all().await?;
    warn!(deleted, "all users deleted");
    Ok(Json(MessageResponse::new("All users deleted successfully")))
}
