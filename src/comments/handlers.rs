use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CommentQuery, CommentView, CreateCommentRequest, UpdateCommentRequest},
    repo::RECIPE_FK,
    repo_types::{CommentChanges, NewComment},
};
use crate::{
    auth::CurrentUser,
    db::StoreError,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    response::{DataResponse, ListResponse, MessageResponse},
    state::AppState,
    validate::{check_length, check_optional_length},
};

const TITLE_MAX: usize = 255;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", get(list_comments))
        .route("/comments/:id", get(get_comment))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create_comment).delete(delete_all_comments))
        .route("/comments/:id", patch(update_comment).delete(delete_comment))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CommentQuery>,
) -> AppResult<Json<ListResponse<CommentView>>> {
    let comments = state.comments.list(query.recipe_id).await?;
    Ok(Json(ListResponse::new(
        comments.into_iter().map(CommentView::from).collect(),
    )))
}

#[instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<CommentView>> {
    let comment = state
        .comments
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))?;
    Ok(Json(comment.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id()))]
pub async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CommentView>>)> {
    let title = payload
        .title
        .ok_or_else(|| AppError::BadRequest("title is required".into()))?;
    check_length("title", &title, TITLE_MAX)?;

    if let Some(recipe_id) = payload.recipe_id {
        if !state.recipes.exists(recipe_id).await? {
            return Err(AppError::not_found("Recipe"));
        }
    }

    let created = state
        .comments
        .create(NewComment {
            author_id: user.id(),
            recipe_id: payload.recipe_id,
            title,
            content: payload.content,
        })
        .await;
    // the recipe can still vanish between the check and the insert
    let comment = match created {
        Ok(c) => c,
        Err(StoreError::MissingReference(fk)) if fk == RECIPE_FK => {
            return Err(AppError::not_found("Recipe"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(comment_id = comment.id, "comment created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Comment created successfully", comment.into())),
    ))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id()))]
pub async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateCommentRequest>,
) -> AppResult<Json<DataResponse<CommentView>>> {
    check_optional_length("title", payload.title.as_deref(), TITLE_MAX)?;

    let existing = state
        .comments
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))?;
    if let Err(e) = user.ensure_can_modify(Some(existing.author_id)) {
        warn!(comment_id = id, "comment update refused");
        return Err(e);
    }

    let changes = CommentChanges {
        title: payload.title,
        content: payload.content,
    };
    let comment = state
        .comments
        .update(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))?;
    Ok(Json(DataResponse::new("Comment updated successfully", comment.into())))
}

#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    let existing = state
        .comments
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))?;
    user.ensure_can_modify(Some(existing.author_id))?;

    if !state.comments.delete(id).await? {
        return Err(AppError::not_found("Comment"));
    }
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}

#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn delete_all_comments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    user.ensure_admin()?;
    let deleted = state.comments.delete_all().await?;
    warn!(deleted, "all comments deleted");
    Ok(Json(MessageResponse::new("All comments deleted successfully")))
}
