//! Shared harness for HTTP-level tests over the in-memory store.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use recipebook::{
    app::build_app,
    auth::password::hash_password,
    memory::MemoryStore,
    state::AppState,
    users::{repo::UserRepo, repo_types::NewUser},
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_api("http://127.0.0.1:8080")
    }

    /// Pages rendered by this app call the API at `api_base_url`.
    pub fn with_api(api_base_url: &str) -> Self {
        let (state, store) = AppState::fake_with_api(api_base_url);
        Self::from_state(state, store)
    }

    /// For tests that swap one repository on the fake state.
    pub fn from_state(state: AppState, store: Arc<MemoryStore>) -> Self {
        Self {
            app: build_app(state),
            store,
        }
    }

    pub async fn seed_user(&self, pseudo: &str, password: &str, is_admin: bool) -> i64 {
        let user = UserRepo::create(
            self.store.as_ref(),
            NewUser {
                pseudo: pseudo.into(),
                password_hash: hash_password(password).unwrap(),
                is_admin,
            },
        )
        .await
        .unwrap();
        user.id
    }

    pub async fn login(&self, pseudo: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "pseudo": pseudo, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, text) = self.raw(request).await;
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);
        (status, json)
    }

    /// The full response, for tests that inspect headers.
    pub async fn response(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, path, token, None).await
    }
}
