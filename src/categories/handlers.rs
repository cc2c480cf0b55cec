use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{dto::CategoryRequest, repo_types::Category};
use crate::{
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath},
    response::{DataResponse, ListResponse, MessageResponse},
    state::AppState,
    validate::{check_length, check_optional_length},
};

const NAME_MAX: usize = 255;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/category", get(list_categories))
        .route("/category/:id", get(get_category))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/category", post(create_category).delete(delete_all_categories))
        .route("/category/:id", patch(update_category).delete(delete_category))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<Category>>> {
    Ok(Json(ListResponse::new(state.categories.list().await?)))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Category>> {
    let category = state
        .categories
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    Ok(Json(category))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CategoryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    let name = payload
        .name
        .ok_or_else(|| AppError::BadRequest("name is required".into()))?;
    check_length("name", &name, NAME_MAX)?;

    let category = state.categories.create(&name).await?;
    info!(category_id = category.id, "category created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Category created successfully", category)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<CategoryRequest>,
) -> AppResult<Json<DataResponse<Category>>> {
    check_optional_length("name", payload.name.as_deref(), NAME_MAX)?;
    let category = state
        .categories
        .update(id, payload.name)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    Ok(Json(DataResponse::new("Category updated successfully", category)))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    if !state.categories.delete(id).await? {
        return Err(AppError::not_found("Category"));
    }
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}

#[instrument(skip(state))]
pub async fn delete_all_categories(
    State(state): State<AppState>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = state.categories.delete_all().await?;
    warn!(deleted, "all categories deleted");
    Ok(Json(MessageResponse::new("All categories deleted successfully")))
}
