use async_trait::async_trait;

use super::repo_types::Category;
use crate::db::{PgStore, StoreResult};

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Category>>;
    async fn find(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn create(&self, name: &str) -> StoreResult<Category>;
    /// `None` as the name leaves the row untouched but still reports whether it exists.
    async fn update(&self, id: i64, name: Option<String>) -> StoreResult<Option<Category>>;
    async fn delete(&self, id: i64) -> StoreResult<bool>;
    async fn delete_all(&self) -> StoreResult<u64>;
}

#[async_trait]
impl CategoryRepo for PgStore {
    async fn list(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, name: &str) -> StoreResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, name: Option<String>) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
               SET name = COALESCE($2, name)
             WHERE id = $1
            RETURNING id, name
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM categories").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
