use serde::{Deserialize, Serialize};

use super::{image::encode_data_url, repo_types::Recipe};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeQuery {
    pub category: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    /// `data:image/png;base64,...`
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub preparation_time: Option<i32>,
    pub like_count: Option<i32>,
    pub category: Option<String>,
}

/// Absent fields are left unchanged; `userId` and `commentIds` are never writable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub preparation_time: Option<i32>,
    pub like_count: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub preparation_time: Option<i32>,
    pub like_count: i32,
    pub category: Option<String>,
    pub comment_ids: Vec<i64>,
}

impl From<Recipe> for RecipeView {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            ingredients: r.ingredients.0,
            steps: r.steps.0,
            image: r.image.as_deref().map(encode_data_url),
            cooking_time: r.cooking_time,
            preparation_time: r.preparation_time,
            like_count: r.like_count,
            category: r.category,
            comment_ids: r.comment_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    #[test]
    fn view_renders_image_as_data_url() {
        let recipe = Recipe {
            id: 1,
            user_id: Some(2),
            title: "Tarte".into(),
            description: None,
            ingredients: Json(vec!["apples".into()]),
            steps: Json(vec![]),
            image: Some(vec![1, 2, 3]),
            cooking_time: Some(40),
            preparation_time: None,
            like_count: 4,
            category: None,
            comment_ids: vec![5],
        };
        let json = serde_json::to_value(RecipeView::from(recipe)).unwrap();
        assert_eq!(json["image"], "data:image/png;base64,AQID");
        assert_eq!(json["userId"], 2);
        assert_eq!(json["cookingTime"], 40);
        assert_eq!(json["commentIds"], serde_json::json!([5]));
    }

    #[test]
    fn create_defaults_lists() {
        let req: CreateRecipeRequest = serde_json::from_str(r#"{"title":"Soup"}"#).unwrap();
        assert!(req.ingredients.is_empty());
        assert!(req.steps.is_empty());
        assert!(req.like_count.is_none());
    }
}
