use serde::{Deserialize, Serialize};

use super::repo_types::Comment;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub recipe_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub recipe_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub author_id: i64,
    pub recipe_id: Option<i64>,
    pub title: String,
    pub content: Option<String>,
}

impl From<Comment> for CommentView {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            author_id: c.author_id,
            recipe_id: c.recipe_id,
            title: c.title,
            content: c.content,
        }
    }
}
