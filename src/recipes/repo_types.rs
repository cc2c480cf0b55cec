use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    /// `None` once the author has been deleted.
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Json<Vec<String>>,
    pub steps: Json<Vec<String>>,
    pub image: Option<Vec<u8>>, // PNG bytes; list queries leave it out
    pub cooking_time: Option<i32>,
    pub preparation_time: Option<i32>,
    pub like_count: i32,
    pub category: Option<String>,
    pub comment_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub image: Option<Vec<u8>>,
    pub cooking_time: Option<i32>,
    pub preparation_time: Option<i32>,
    pub like_count: i32,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub image: Option<Vec<u8>>,
    pub cooking_time: Option<i32>,
    pub preparation_time: Option<i32>,
    pub like_count: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub category: Option<String>,
    pub user_id: Option<i64>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.category
            .as_ref()
            .map_or(true, |c| recipe.category.as_ref() == Some(c))
            && self.user_id.map_or(true, |u| recipe.user_id == Some(u))
    }
}
