use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    pub recipe_id: Option<i64>,
    pub title: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: i64,
    pub recipe_id: Option<i64>,
    pub title: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}
