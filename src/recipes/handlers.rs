use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateRecipeRequest, RecipeQuery, RecipeView, UpdateRecipeRequest},
    image::{decode_data_url, ImageError},
    repo_types::{NewRecipe, RecipeChanges, RecipeFilter},
};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    response::{DataResponse, ListResponse, MessageResponse},
    state::AppState,
    validate::{check_length, check_optional_length},
};

const TITLE_MAX: usize = 100;
const CATEGORY_MAX: usize = 50;
const TOP_LIMIT: i64 = 10;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipe", get(list_recipes))
        .route("/recipe/top", get(top_recipes))
        .route("/recipe/:id", get(get_recipe))
}

/// `body_limit` replaces axum's 2 MB default so base64 images fit.
pub fn write_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/recipe", post(create_recipe).delete(delete_all_recipes))
        .route("/recipe/:id", patch(update_recipe).delete(delete_recipe))
        .layer(DefaultBodyLimit::max(body_limit))
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

fn decode_image(value: Option<&str>) -> AppResult<Option<Vec<u8>>> {
    match value {
        Some(v) => Ok(decode_data_url(v)?),
        None => Ok(None),
    }
}

fn check_counts(cooking: Option<i32>, preparation: Option<i32>, likes: Option<i32>) -> AppResult<()> {
    for (field, value) in [
        ("cookingTime", cooking),
        ("preparationTime", preparation),
        ("likeCount", likes),
    ] {
        if value.is_some_and(|v| v < 0) {
            return Err(AppError::BadRequest(format!("{} must not be negative", field)));
        }
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RecipeQuery>,
) -> AppResult<Json<ListResponse<RecipeView>>> {
    let filter = RecipeFilter {
        category: query.category,
        user_id: query.user_id,
    };
    let recipes = state.recipes.list(filter).await?;
    Ok(Json(ListResponse::new(
        recipes.into_iter().map(RecipeView::from).collect(),
    )))
}

#[instrument(skip(state))]
pub async fn top_recipes(
    State(state): State<AppState>,
) -> AppResult<Json<ListResponse<RecipeView>>> {
    let recipes = state.recipes.top_liked(TOP_LIMIT).await?;
    Ok(Json(ListResponse::new(
        recipes.into_iter().map(RecipeView::from).collect(),
    )))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<RecipeView>> {
    let recipe = state
        .recipes
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id()))]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<CreateRecipeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RecipeView>>)> {
    let title = payload
        .title
        .ok_or_else(|| AppError::BadRequest("title is required".into()))?;
    check_length("title", &title, TITLE_MAX)?;
    check_optional_length("category", payload.category.as_deref(), CATEGORY_MAX)?;
    check_counts(payload.cooking_time, payload.preparation_time, payload.like_count)?;
    let image = decode_image(payload.image.as_deref())?;

    let recipe = state
        .recipes
        .create(NewRecipe {
            user_id: user.id(),
            title,
            description: payload.description,
            ingredients: payload.ingredients,
            steps: payload.steps,
            image,
            cooking_time: payload.cooking_time,
            preparation_time: payload.preparation_time,
            like_count: payload.like_count.unwrap_or(0),
            category: payload.category,
        })
        .await?;

    info!(recipe_id = recipe.id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Recipe created successfully", recipe.into())),
    ))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id()))]
pub async fn update_recipe(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateRecipeRequest>,
) -> AppResult<Json<DataResponse<RecipeView>>> {
    let existing = state
        .recipes
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;
    if let Err(e) = user.ensure_can_modify(existing.user_id) {
        warn!(recipe_id = id, owner = ?existing.user_id, "recipe update refused");
        return Err(e);
    }

    check_optional_length("title", payload.title.as_deref(), TITLE_MAX)?;
    check_optional_length("category", payload.category.as_deref(), CATEGORY_MAX)?;
    check_counts(payload.cooking_time, payload.preparation_time, payload.like_count)?;
    let image = decode_image(payload.image.as_deref())?;

    let changes = RecipeChanges {
        title: payload.title,
        description: payload.description,
        ingredients: payload.ingredients,
        steps: payload.steps,
        image,
        cooking_time: payload.cooking_time,
        preparation_time: payload.preparation_time,
        like_count: payload.like_count,
        category: payload.category,
    };
    let recipe = state
        .recipes
        .update(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;

    info!(recipe_id = id, "recipe updated");
    Ok(Json(DataResponse::new("Recipe updated successfully", recipe.into())))
}

#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    let existing = state
        .recipes
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;
    user.ensure_can_modify(existing.user_id)?;

    if !state.recipes.delete(id).await? {
        return Err(AppError::not_found("Recipe"));
    }
    info!(recipe_id = id, "recipe deleted");
    Ok(Json(MessageResponse::new("Recipe deleted successfully")))
}

#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn delete_all_recipes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    user.ensure_admin()?;
    let deleted = state.recipes.delete_all().await?;
    warn!(deleted, "all recipes deleted");
    Ok(Json(MessageResponse::new("All recipes deleted successfully")))
}
