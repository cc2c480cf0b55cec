//! In-memory implementation of every repository trait, mirroring the
//! constraints and cascades of the Postgres schema. Backs `AppState::fake()`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    auth::{
        repo::TokenStore,
        repo_types::{AuthToken, NewAuthToken, Session},
    },
    categories::{repo::CategoryRepo, repo_types::Category},
    comments::{
        repo::{CommentRepo, RECIPE_FK},
        repo_types::{Comment, CommentChanges, NewComment},
    },
    db::{StoreError, StoreResult},
    recipes::{
        repo::RecipeRepo,
        repo_types::{NewRecipe, Recipe, RecipeChanges, RecipeFilter},
    },
    users::{
        repo::UserRepo,
        repo_types::{NewUser, User, UserChanges, UserProfile},
    },
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    tokens: BTreeMap<i64, AuthToken>,
    recipes: BTreeMap<i64, Recipe>,
    comments: BTreeMap<i64, Comment>,
    categories: BTreeMap<i64, Category>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn profile(&self, user: &User) -> UserProfile {
        UserProfile {
            user: user.clone(),
            recipe_ids: self
                .recipes
                .values()
                .filter(|r| r.user_id == Some(user.id))
                .map(|r| r.id)
                .collect(),
            comment_ids: self
                .comments
                .values()
                .filter(|c| c.author_id == user.id)
                .map(|c| c.id)
                .collect(),
        }
    }

    fn with_comment_ids(&self, recipe: &Recipe) -> Recipe {
        let mut recipe = recipe.clone();
        recipe.comment_ids = self
            .comments
            .values()
            .filter(|c| c.recipe_id == Some(recipe.id))
            .map(|c| c.id)
            .collect();
        recipe
    }

    fn pseudo_taken(&self, pseudo: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.pseudo == pseudo && Some(u.id) != except)
    }

    fn remove_user(&mut self, id: i64) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        self.tokens.retain(|_, t| t.user_id != id);
        self.comments.retain(|_, c| c.author_id != id);
        for recipe in self.recipes.values_mut() {
            if recipe.user_id == Some(id) {
                recipe.user_id = None;
            }
        }
        true
    }

    fn remove_recipe(&mut self, id: i64) -> bool {
        if self.recipes.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, c| c.recipe_id != Some(id));
        true
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of token rows physically stored, expired ones included.
    pub async fn token_count(&self) -> usize {
        self.tables.lock().await.tokens.len()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<UserProfile>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().map(|u| t.profile(u)).collect())
    }

    async fn find(&self, id: i64) -> StoreResult<Option<UserProfile>> {
        let t = self.tables.lock().await;
        Ok(t.users.get(&id).map(|u| t.profile(u)))
    }

    async fn find_by_pseudo(&self, pseudo: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.pseudo == pseudo).cloned())
    }

    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.lock().await;
        if t.pseudo_taken(&new.pseudo, None) {
            return Err(StoreError::Duplicate("uq_users_pseudo".into()));
        }
        let user = User {
            id: t.next_id(),
            pseudo: new.pseudo,
            password_hash: new.password_hash,
            is_admin: new.is_admin,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<Option<UserProfile>> {
        let mut t = self.tables.lock().await;
        if let Some(pseudo) = &changes.pseudo {
            if t.pseudo_taken(pseudo, Some(id)) {
                return Err(StoreError::Duplicate("uq_users_pseudo".into()));
            }
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(pseudo) = changes.pseudo {
            user.pseudo = pseudo;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(is_admin) = changes.is_admin {
            user.is_admin = is_admin;
        }
        let user = user.clone();
        Ok(Some(t.profile(&user)))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().await.remove_user(id))
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let ids: Vec<i64> = t.users.keys().copied().collect();
        for id in &ids {
            t.remove_user(*id);
        }
        Ok(ids.len() as u64)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert(&self, new: NewAuthToken) -> StoreResult<AuthToken> {
        let mut t = self.tables.lock().await;
        if t.tokens.values().any(|tok| tok.token == new.token) {
            return Err(StoreError::Duplicate("uq_auth_tokens_token".into()));
        }
        let token = AuthToken {
            id: t.next_id(),
            token: new.token,
            user_id: new.user_id,
            expires_at: new.expires_at,
        };
        t.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_valid(&self, token: &str, now: OffsetDateTime) -> StoreResult<Option<Session>> {
        let t = self.tables.lock().await;
        let session = t
            .tokens
            .values()
            .find(|tok| tok.token == token && !tok.is_expired(now))
            .and_then(|tok| {
                t.users.get(&tok.user_id).map(|user| Session {
                    token_id: tok.id,
                    expires_at: tok.expires_at,
                    user: user.clone(),
                })
            });
        Ok(session)
    }

    async fn delete(&self, token_id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().await.tokens.remove(&token_id).is_some())
    }

    async fn purge_expired(&self, now: OffsetDateTime) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let before = t.tokens.len();
        t.tokens.retain(|_, tok| !tok.is_expired(now));
        Ok((before - t.tokens.len()) as u64)
    }
}

#[async_trait]
impl RecipeRepo for MemoryStore {
    async fn list(&self, filter: RecipeFilter) -> StoreResult<Vec<Recipe>> {
        let t = self.tables.lock().await;
        Ok(t.recipes
            .values()
            .filter(|r| filter.matches(r))
            .map(|r| Recipe {
                image: None,
                ..t.with_comment_ids(r)
            })
            .collect())
    }

    async fn top_liked(&self, limit: i64) -> StoreResult<Vec<Recipe>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<Recipe> = t
            .recipes
            .values()
            .map(|r| Recipe {
                image: None,
                ..t.with_comment_ids(r)
            })
            .collect();
        rows.sort_by(|a, b| b.like_count.cmp(&a.like_count).then(a.id.cmp(&b.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Recipe>> {
        let t = self.tables.lock().await;
        Ok(t.recipes.get(&id).map(|r| t.with_comment_ids(r)))
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().await.recipes.contains_key(&id))
    }

    async fn create(&self, new: NewRecipe) -> StoreResult<Recipe> {
        let mut t = self.tables.lock().await;
        let recipe = Recipe {
            id: t.next_id(),
            user_id: Some(new.user_id),
            title: new.title,
            description: new.description,
            ingredients: Json(new.ingredients),
            steps: Json(new.steps),
            image: new.image,
            cooking_time: new.cooking_time,
            preparation_time: new.preparation_time,
            like_count: new.like_count,
            category: new.category,
            comment_ids: Vec::new(),
        };
        t.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn update(&self, id: i64, changes: RecipeChanges) -> StoreResult<Option<Recipe>> {
        let mut t = self.tables.lock().await;
        let Some(recipe) = t.recipes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            recipe.title = title;
        }
        if let Some(description) = changes.description {
            recipe.description = Some(description);
        }
        if let Some(ingredients) = changes.ingredients {
            recipe.ingredients = Json(ingredients);
        }
        if let Some(steps) = changes.steps {
            recipe.steps = Json(steps);
        }
        if let Some(image) = changes.image {
            recipe.image = Some(image);
        }
        if let Some(cooking_time) = changes.cooking_time {
            recipe.cooking_time = Some(cooking_time);
        }
        if let Some(preparation_time) = changes.preparation_time {
            recipe.preparation_time = Some(preparation_time);
        }
        if let Some(like_count) = changes.like_count {
            recipe.like_count = like_count;
        }
        if let Some(category) = changes.category {
            recipe.category = Some(category);
        }
        let recipe = recipe.clone();
        Ok(Some(t.with_comment_ids(&recipe)))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().await.remove_recipe(id))
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let ids: Vec<i64> = t.recipes.keys().copied().collect();
        for id in &ids {
            t.remove_recipe(*id);
        }
        Ok(ids.len() as u64)
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn list(&self, recipe_id: Option<i64>) -> StoreResult<Vec<Comment>> {
        let t = self.tables.lock().await;
        Ok(t.comments
            .values()
            .filter(|c| recipe_id.map_or(true, |r| c.recipe_id == Some(r)))
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Comment>> {
        Ok(self.tables.lock().await.comments.get(&id).cloned())
    }

    async fn create(&self, new: NewComment) -> StoreResult<Comment> {
        let mut t = self.tables.lock().await;
        if !t.users.contains_key(&new.author_id) {
            return Err(StoreError::MissingReference("comments_author_id_fkey".into()));
        }
        if new.recipe_id.is_some_and(|id| !t.recipes.contains_key(&id)) {
            return Err(StoreError::MissingReference(RECIPE_FK.into()));
        }
        let comment = Comment {
            id: t.next_id(),
            author_id: new.author_id,
            recipe_id: new.recipe_id,
            title: new.title,
            content: new.content,
        };
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, id: i64, changes: CommentChanges) -> StoreResult<Option<Comment>> {
        let mut t = self.tables.lock().await;
        let Some(comment) = t.comments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            comment.title = title;
        }
        if let Some(content) = changes.content {
            comment.content = Some(content);
        }
        Ok(Some(comment.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().await.comments.remove(&id).is_some())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let count = t.comments.len() as u64;
        t.comments.clear();
        Ok(count)
    }
}

#[async_trait]
impl CategoryRepo for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.lock().await.categories.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn create(&self, name: &str) -> StoreResult<Category> {
        let mut t = self.tables.lock().await;
        let category = Category {
            id: t.next_id(),
            name: name.to_string(),
        };
        t.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i64, name: Option<String>) -> StoreResult<Option<Category>> {
        let mut t = self.tables.lock().await;
        let Some(category) = t.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            category.name = name;
        }
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().await.categories.remove(&id).is_some())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let count = t.categories.len() as u64;
        t.categories.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn new_user(pseudo: &str) -> NewUser {
        NewUser {
            pseudo: pseudo.into(),
            password_hash: "hash".into(),
            is_admin: false,
        }
    }

    fn new_recipe(user_id: i64, title: &str) -> NewRecipe {
        NewRecipe {
            user_id,
            title: title.into(),
            description: None,
            ingredients: vec!["flour".into()],
            steps: vec!["bake".into()],
            image: None,
            cooking_time: None,
            preparation_time: None,
            like_count: 0,
            category: Some("dessert".into()),
        }
    }

    #[tokio::test]
    async fn duplicate_pseudo_is_rejected() {
        let store = MemoryStore::new();
        UserRepo::create(&store, new_user("alice")).await.unwrap();
        let err = UserRepo::create(&store, new_user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref c) if c == "uq_users_pseudo"));
    }

    #[tokio::test]
    async fn duplicate_token_is_rejected() {
        let store = MemoryStore::new();
        let user = UserRepo::create(&store, new_user("alice")).await.unwrap();
        let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);
        let new = NewAuthToken {
            token: "abc".into(),
            user_id: user.id,
            expires_at,
        };
        store.insert(new.clone()).await.unwrap();
        let err = store.insert(new).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.token_count().await, 1);
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let store = MemoryStore::new();
        let alice = UserRepo::create(&store, new_user("alice")).await.unwrap();
        let bob = UserRepo::create(&store, new_user("bob")).await.unwrap();
        let recipe = RecipeRepo::create(&store, new_recipe(alice.id, "Tarte")).await.unwrap();
        CommentRepo::create(
            &store,
            NewComment {
                author_id: alice.id,
                recipe_id: Some(recipe.id),
                title: "mine".into(),
                content: None,
            },
        )
        .await
        .unwrap();
        let bobs = CommentRepo::create(
            &store,
            NewComment {
                author_id: bob.id,
                recipe_id: Some(recipe.id),
                title: "yum".into(),
                content: None,
            },
        )
        .await
        .unwrap();
        store
            .insert(NewAuthToken {
                token: "t".into(),
                user_id: alice.id,
                expires_at: OffsetDateTime::now_utc() + Duration::hours(1),
            })
            .await
            .unwrap();

        assert!(UserRepo::delete(&store, alice.id).await.unwrap());

        assert_eq!(store.token_count().await, 0);
        let recipe = RecipeRepo::find(&store, recipe.id).await.unwrap().unwrap();
        assert_eq!(recipe.user_id, None);
        assert_eq!(recipe.comment_ids, vec![bobs.id]);
    }

    #[tokio::test]
    async fn comment_references_must_exist() {
        let store = MemoryStore::new();
        let alice = UserRepo::create(&store, new_user("alice")).await.unwrap();
        let recipe = RecipeRepo::create(&store, new_recipe(alice.id, "Tarte")).await.unwrap();
        assert!(store.exists(recipe.id).await.unwrap());
        assert!(!store.exists(recipe.id + 100).await.unwrap());

        let comment = |author_id, recipe_id| NewComment {
            author_id,
            recipe_id,
            title: "hm".into(),
            content: None,
        };
        let err = CommentRepo::create(&store, comment(alice.id, Some(recipe.id + 100)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(ref c) if c == RECIPE_FK));
        let err = CommentRepo::create(&store, comment(alice.id + 100, None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
        assert!(CommentRepo::create(&store, comment(alice.id, None)).await.is_ok());
    }

    #[tokio::test]
    async fn profile_ids_are_derived() {
        let store = MemoryStore::new();
        let alice = UserRepo::create(&store, new_user("alice")).await.unwrap();
        let r1 = RecipeRepo::create(&store, new_recipe(alice.id, "A")).await.unwrap();
        let r2 = RecipeRepo::create(&store, new_recipe(alice.id, "B")).await.unwrap();
        let profile = UserRepo::find(&store, alice.id).await.unwrap().unwrap();
        assert_eq!(profile.recipe_ids, vec![r1.id, r2.id]);
        assert!(profile.comment_ids.is_empty());

        RecipeRepo::delete(&store, r1.id).await.unwrap();
        let profile = UserRepo::find(&store, alice.id).await.unwrap().unwrap();
        assert_eq!(profile.recipe_ids, vec![r2.id]);
    }

    #[tokio::test]
    async fn top_liked_orders_by_likes() {
        let store = MemoryStore::new();
        let alice = UserRepo::create(&store, new_user("alice")).await.unwrap();
        for (title, likes) in [("low", 1), ("high", 9), ("mid", 5)] {
            let mut new = new_recipe(alice.id, title);
            new.like_count = likes;
            RecipeRepo::create(&store, new).await.unwrap();
        }
        let top = store.top_liked(2).await.unwrap();
        let titles: Vec<&str> = top.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "mid"]);
    }
}
