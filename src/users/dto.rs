use serde::{Deserialize, Serialize};

use super::repo_types::{User, UserProfile};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub pseudo: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// Absent fields are left unchanged; `recipeIds`/`commentIds` are derived and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub pseudo: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub pseudo: String,
    pub is_admin: bool,
    pub recipe_ids: Vec<i64>,
    pub comment_ids: Vec<i64>,
}

impl From<UserProfile> for UserView {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.user.id,
            pseudo: profile.user.pseudo,
            is_admin: profile.user.is_admin,
            recipe_ids: profile.recipe_ids,
            comment_ids: profile.comment_ids,
        }
    }
}

/// A freshly created user owns nothing yet.
impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            pseudo: user.pseudo,
            is_admin: user.is_admin,
            recipe_ids: Vec::new(),
            comment_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_is_camel_case_without_hash() {
        let view = UserView::from(UserProfile {
            user: User {
                id: 3,
                pseudo: "bob".into(),
                password_hash: "$argon2id$x".into(),
                is_admin: false,
            },
            recipe_ids: vec![1, 2],
            comment_ids: vec![],
        });
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "pseudo": "bob",
                "isAdmin": false,
                "recipeIds": [1, 2],
                "commentIds": []
            })
        );
    }

    #[test]
    fn update_ignores_derived_fields() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"isAdmin":true,"recipeIds":[9,9]}"#).unwrap();
        assert_eq!(req.is_admin, Some(true));
        assert!(req.pseudo.is_none());
    }
}
