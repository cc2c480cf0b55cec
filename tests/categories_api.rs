mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn category_crud() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/api/category", None, Some(json!({ "name": "Desserts" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Category created successfully");
    let path = format!("/api/category/{}", body["data"]["id"]);

    let (status, body) = app
        .send(Method::PATCH, &path, None, Some(json!({ "name": "Sweets" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Sweets");

    let (_, list) = app.get("/api/category", None).await;
    assert_eq!(list["count"], 1);

    let (status, _) = app.send(Method::DELETE, &path, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .send(Method::POST, "/api/category", None, Some(json!({ "name": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.send(Method::POST, "/api/category", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_delete_and_health() {
    let app = TestApp::new();
    for name in ["Starters", "Mains"] {
        app.send(Method::POST, "/api/category", None, Some(json!({ "name": name })))
            .await;
    }
    let (status, body) = app.send(Method::DELETE, "/api/category", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All categories deleted successfully");
    let (_, list) = app.get("/api/category", None).await;
    assert_eq!(list["count"], 0);

    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, text) = app.raw(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "ok");
}
