use async_trait::async_trait;
use sqlx::types::Json;

use super::repo_types::{NewRecipe, Recipe, RecipeChanges, RecipeFilter};
use crate::db::{PgStore, StoreResult};

#[async_trait]
pub trait RecipeRepo: Send + Sync {
    /// Recipes without their image, ordered by id.
    async fn list(&self, filter: RecipeFilter) -> StoreResult<Vec<Recipe>>;
    /// Most liked first, without images.
    async fn top_liked(&self, limit: i64) -> StoreResult<Vec<Recipe>>;
    async fn find(&self, id: i64) -> StoreResult<Option<Recipe>>;
    /// Presence check that never loads the image.
    async fn exists(&self, id: i64) -> StoreResult<bool>;
    async fn create(&self, new: NewRecipe) -> StoreResult<Recipe>;
    async fn update(&self, id: i64, changes: RecipeChanges) -> StoreResult<Option<Recipe>>;
    async fn delete(&self, id: i64) -> StoreResult<bool>;
    async fn delete_all(&self) -> StoreResult<u64>;
}

#[async_trait]
impl RecipeRepo for PgStore {
    async fn list(&self, filter: RecipeFilter) -> StoreResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.user_id, r.title, r.description, r.ingredients, r.steps,
                   NULL::bytea AS image, r.cooking_time, r.preparation_time,
                   r.like_count, r.category,
                   ARRAY(SELECT c.id FROM comments c WHERE c.recipe_id = r.id ORDER BY c.id) AS comment_ids
              FROM recipes r
             WHERE ($1::text IS NULL OR r.category = $1)
               AND ($2::bigint IS NULL OR r.user_id = $2)
             ORDER BY r.id
            "#,
        )
        .bind(filter.category)
        .bind(filter.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn top_liked(&self, limit: i64) -> StoreResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.user_id, r.title, r.description, r.ingredients, r.steps,
                   NULL::bytea AS image, r.cooking_time, r.preparation_time,
                   r.like_count, r.category,
                   ARRAY(SELECT c.id FROM comments c WHERE c.recipe_id = r.id ORDER BY c.id) AS comment_ids
              FROM recipes r
             ORDER BY r.like_count DESC, r.id ASC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.user_id, r.title, r.description, r.ingredients, r.steps,
                   r.image, r.cooking_time, r.preparation_time, r.like_count, r.category,
                   ARRAY(SELECT c.id FROM comments c WHERE c.recipe_id = r.id ORDER BY c.id) AS comment_ids
              FROM recipes r
             WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    async fn create(&self, new: NewRecipe) -> StoreResult<Recipe> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, description, ingredients, steps, image,
                                 cooking_time, preparation_time, like_count, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, user_id, title, description, ingredients, steps, image,
                      cooking_time, preparation_time, like_count, category,
                      ARRAY[]::bigint[] AS comment_ids
            "#,
        )
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(Json(&new.ingredients))
        .bind(Json(&new.steps))
        .bind(&new.image)
        .bind(new.cooking_time)
        .bind(new.preparation_time)
        .bind(new.like_count)
        .bind(&new.category)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, changes: RecipeChanges) -> StoreResult<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            WITH updated AS (
                UPDATE recipes
                   SET title = COALESCE($2, title),
                       description = COALESCE($3, description),
                       ingredients = COALESCE($4, ingredients),
                       steps = COALESCE($5, steps),
                       image = COALESCE($6, image),
                       cooking_time = COALESCE($7, cooking_time),
                       preparation_time = COALESCE($8, preparation_time),
                       like_count = COALESCE($9, like_count),
                       category = COALESCE($10, category)
                 WHERE id = $1
                RETURNING *
            )
            SELECT r.id, r.user_id, r.title, r.description, r.ingredients, r.steps,
                   r.image, r.cooking_time, r.preparation_time, r.like_count, r.category,
                   ARRAY(SELECT c.id FROM comments c WHERE c.recipe_id = r.id ORDER BY c.id) AS comment_ids
              FROM updated r
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.ingredients.map(Json))
        .bind(changes.steps.map(Json))
        .bind(changes.image)
        .bind(changes.cooking_time)
        .bind(changes.preparation_time)
        .bind(changes.like_count)
        .bind(changes.category)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM recipes").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
