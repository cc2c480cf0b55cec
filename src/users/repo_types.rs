use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub pseudo: String,
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub is_admin: bool,
}

/// A user together with the ids of the rows they authored, derived at read time.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    #[sqlx(flatten)]
    pub user: User,
    pub recipe_ids: Vec<i64>,
    pub comment_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub pseudo: String,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub pseudo: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}
