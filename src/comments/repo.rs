use async_trait::async_trait;

use super::repo_types::{Comment, CommentChanges, NewComment};
use crate::db::{PgStore, StoreResult};

/// Foreign key from `comments.recipe_id` to `recipes.id`.
pub const RECIPE_FK: &str = "fk_comments_recipe";

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn list(&self, recipe_id: Option<i64>) -> StoreResult<Vec<Comment>>;
    async fn find(&self, id: i64) -> StoreResult<Option<Comment>>;
    async fn create(&self, new: NewComment) -> StoreResult<Comment>;
    async fn update(&self, id: i64, changes: CommentChanges) -> StoreResult<Option<Comment>>;
    async fn delete(&self, id: i64) -> StoreResult<bool>;
    async fn delete_all(&self) -> StoreResult<u64>;
}

#[async_trait]
impl CommentRepo for PgStore {
    async fn list(&self, recipe_id: Option<i64>) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, author_id, recipe_id, title, content
              FROM comments
             WHERE ($1::bigint IS NULL OR recipe_id = $1)
             ORDER BY id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(
            "SELECT id, author_id, recipe_id, title, content FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, new: NewComment) -> StoreResult<Comment> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (author_id, recipe_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, recipe_id, title, content
            "#,
        )
        .bind(new.author_id)
        .bind(new.recipe_id)
        .bind(&new.title)
        .bind(&new.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, changes: CommentChanges) -> StoreResult<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content)
             WHERE id = $1
            RETURNING id, author_id, recipe_id, title, content
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM comments").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
