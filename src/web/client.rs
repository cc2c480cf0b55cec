use anyhow::Context;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use time::OffsetDateTime;

/// Subset of the recipe JSON the pages need.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeItem {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub preparation_time: Option<i32>,
    #[serde(default)]
    pub like_count: i32,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i64,
    pub pseudo: String,
    pub is_admin: bool,
}

/// Token handed out by `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct VerifyEnvelope {
    user: SessionUser,
}

/// HTTP client the server-rendered pages use to reach the JSON API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<Vec<T>> {
        let res = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {}", path))?
            .error_for_status()?;
        Ok(res.json::<ListEnvelope<T>>().await?.data)
    }

    pub async fn categories(&self) -> anyhow::Result<Vec<CategoryItem>> {
        self.get_list("/category").await
    }

    pub async fn recipes(&self, user_id: Option<i64>) -> anyhow::Result<Vec<RecipeItem>> {
        match user_id {
            Some(id) => self.get_list(&format!("/recipe?userId={}", id)).await,
            None => self.get_list("/recipe").await,
        }
    }

    /// `Ok(None)` when the API answers 404.
    pub async fn recipe(&self, id: i64) -> anyhow::Result<Option<RecipeItem>> {
        let res = self
            .http
            .get(self.url(&format!("/recipe/{}", id)))
            .send()
            .await
            .with_context(|| format!("GET /recipe/{}", id))?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(res.error_for_status()?.json().await?))
    }

    /// Resolves a token through `/auth/verify`; any non-success answer means no session.
    pub async fn verify(&self, token: &str) -> anyhow::Result<Option<SessionUser>> {
        let res = self
            .http
            .get(self.url("/auth/verify"))
            .bearer_auth(token)
            .send()
            .await
            .context("GET /auth/verify")?;
        if !res.status().is_success() {
            return Ok(None);
        }
        Ok(Some(res.json::<VerifyEnvelope>().await?.user))
    }

    /// `Ok(None)` when the API turns the credentials down (400 or 401).
    pub async fn login(&self, pseudo: &str, password: &str) -> anyhow::Result<Option<LoginGrant>> {
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "pseudo": pseudo, "password": password }))
            .send()
            .await
            .context("POST /auth/login")?;
        if matches!(res.status(), StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            return Ok(None);
        }
        Ok(Some(res.error_for_status()?.json().await?))
    }

    /// Revokes `token`. `Ok(false)` when the API no longer knew it.
    pub async fn logout(&self, token: &str) -> anyhow::Result<bool> {
        let res = self
            .http
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await
            .context("POST /auth/logout")?;
        if res.status() == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        res.error_for_status()?;
        Ok(true)
    }
}
