use async_trait::async_trait;

use super::repo_types::{NewUser, User, UserChanges, UserProfile};
use crate::db::{PgStore, StoreResult};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<UserProfile>>;
    async fn find(&self, id: i64) -> StoreResult<Option<UserProfile>>;
    async fn find_by_pseudo(&self, pseudo: &str) -> StoreResult<Option<User>>;
    async fn create(&self, new: NewUser) -> StoreResult<User>;
    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserProfile>>;
    /// Removes the user; tokens and comments cascade, recipes become anonymous.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
    async fn delete_all(&self) -> StoreResult<u64>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn list(&self) -> StoreResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT u.id, u.pseudo, u.password_hash, u.is_admin,
                   ARRAY(SELECT r.id FROM recipes r WHERE r.user_id = u.id ORDER BY r.id) AS recipe_ids,
                   ARRAY(SELECT c.id FROM comments c WHERE c.author_id = u.id ORDER BY c.id) AS comment_ids
            FROM users u
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT u.id, u.pseudo, u.password_hash, u.is_admin,
                   ARRAY(SELECT r.id FROM recipes r WHERE r.user_id = u.id ORDER BY r.id) AS recipe_ids,
                   ARRAY(SELECT c.id FROM comments c WHERE c.author_id = u.id ORDER BY c.id) AS comment_ids
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_pseudo(&self, pseudo: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, pseudo, password_hash, is_admin
            FROM users
            WHERE pseudo = $1
            "#,
        )
        .bind(pseudo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (pseudo, password_hash, is_admin)
            VALUES ($1, $2, $3)
            RETURNING id, pseudo, password_hash, is_admin
            "#,
        )
        .bind(&new.pseudo)
        .bind(&new.password_hash)
        .bind(new.is_admin)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            WITH updated AS (
                UPDATE users
                   SET pseudo = COALESCE($2, pseudo),
                       password_hash = COALESCE($3, password_hash),
                       is_admin = COALESCE($4, is_admin)
                 WHERE id = $1
                RETURNING id, pseudo, password_hash, is_admin
            )
            SELECT u.id, u.pseudo, u.password_hash, u.is_admin,
                   ARRAY(SELECT r.id FROM recipes r WHERE r.user_id = u.id ORDER BY r.id) AS recipe_ids,
                   ARRAY(SELECT c.id FROM comments c WHERE c.author_id = u.id ORDER BY c.id) AS comment_ids
            FROM updated u
            "#,
        )
        .bind(id)
        .bind(changes.pseudo)
        .bind(changes.password_hash)
        .bind(changes.is_admin)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
