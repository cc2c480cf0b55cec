mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use recipebook::recipes::image::encode_data_url;
use serde_json::{json, Value};

async fn create_recipe(app: &TestApp, token: &str, body: Value) -> i64 {
    let (status, body) = app.send(Method::POST, "/api/recipe", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn create_requires_authentication() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/api/recipe", None, Some(json!({ "title": "Tarte" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing authorization token");
}

#[tokio::test]
async fn create_sets_owner_and_lists() {
    let app = TestApp::new();
    let alice = app.seed_user("alice", "secret123", false).await;
    let token = app.login("alice", "secret123").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/recipe",
            Some(&token),
            Some(json!({
                "title": "Tarte Tatin",
                "ingredients": ["apples", "butter"],
                "steps": ["caramelize", "bake"],
                "cookingTime": 45,
                "category": "dessert"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Recipe created successfully");
    assert_eq!(body["data"]["userId"], alice);
    assert_eq!(body["data"]["likeCount"], 0);

    let (status, list) = app.get("/api/recipe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["success"], true);
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["title"], "Tarte Tatin");

    let (_, by_user) = app.get(&format!("/api/recipe?userId={}", alice), None).await;
    assert_eq!(by_user["count"], 1);
    let (_, by_category) = app.get("/api/recipe?category=starter", None).await;
    assert_eq!(by_category["count"], 0);
}

#[tokio::test]
async fn missing_title_is_bad_request() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    let token = app.login("alice", "secret123").await;
    let (status, body) = app
        .send(Method::POST, "/api/recipe", Some(&token), Some(json!({ "steps": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "title is required");
}

#[tokio::test]
async fn png_image_round_trips_as_data_url() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    let token = app.login("alice", "secret123").await;
    let image = "data:image/png;base64,iVBORw0KGgo=";

    let id = create_recipe(&app, &token, json!({ "title": "Soup", "image": image })).await;

    let (status, recipe) = app.get(&format!("/api/recipe/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe["image"], image);

    let (_, list) = app.get("/api/recipe", None).await;
    assert!(list["data"][0]["image"].is_null());
}

#[tokio::test]
async fn image_larger_than_two_megabytes_is_accepted() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    let token = app.login("alice", "secret123").await;
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    png.resize(2_000_000, 0);
    let image = encode_data_url(&png);
    assert!(image.len() > 2 * 1024 * 1024);

    let id = create_recipe(&app, &token, json!({ "title": "Big", "image": image })).await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/recipe/{}", id),
            Some(&token),
            Some(json!({ "image": image })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, recipe) = app.get(&format!("/api/recipe/{}", id), None).await;
    assert_eq!(recipe["image"].as_str().map(str::len), Some(image.len()));
}

#[tokio::test]
async fn non_png_image_is_rejected() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    let token = app.login("alice", "secret123").await;
    let (status, _) = app
        .send(
            Method::POST,
            "/api/recipe",
            Some(&token),
            Some(json!({ "title": "Soup", "image": "data:image/gif;base64,R0lGOD" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_owner_or_admin_may_patch() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    app.seed_user("bob", "hunter22", false).await;
    app.seed_user("root", "toor1234", true).await;
    let alice = app.login("alice", "secret123").await;
    let bob = app.login("bob", "hunter22").await;
    let root = app.login("root", "toor1234").await;

    let id = create_recipe(&app, &alice, json!({ "title": "Tarte" })).await;
    let path = format!("/api/recipe/{}", id);

    let (status, body) = app
        .send(Method::PATCH, &path, Some(&bob), Some(json!({ "title": "Mine now" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    let (status, body) = app
        .send(Method::PATCH, &path, Some(&alice), Some(json!({ "likeCount": 3 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["likeCount"], 3);
    assert_eq!(body["data"]["title"], "Tarte");

    let (status, body) = app
        .send(Method::PATCH, &path, Some(&root), Some(json!({ "title": "Tarte fine" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Recipe updated successfully");
    assert_eq!(body["data"]["title"], "Tarte fine");
}

#[tokio::test]
async fn delete_rules() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    app.seed_user("bob", "hunter22", false).await;
    let alice = app.login("alice", "secret123").await;
    let bob = app.login("bob", "hunter22").await;
    let id = create_recipe(&app, &alice, json!({ "title": "Tarte" })).await;
    let path = format!("/api/recipe/{}", id);

    let (status, _) = app.send(Method::DELETE, &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::DELETE, &path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Recipe deleted successfully");

    let (status, body) = app.get(&path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Recipe not found");
}

#[tokio::test]
async fn bulk_delete_is_admin_only() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    app.seed_user("root", "toor1234", true).await;
    let alice = app.login("alice", "secret123").await;
    let root = app.login("root", "toor1234").await;
    create_recipe(&app, &alice, json!({ "title": "A" })).await;
    create_recipe(&app, &alice, json!({ "title": "B" })).await;

    let (status, _) = app.send(Method::DELETE, "/api/recipe", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::DELETE, "/api/recipe", Some(&root), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All recipes deleted successfully");
    let (_, list) = app.get("/api/recipe", None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn top_recipes_sorted_by_likes() {
    let app = TestApp::new();
    app.seed_user("alice", "secret123", false).await;
    let token = app.login("alice", "secret123").await;
    for (title, likes) in [("low", 1), ("high", 10), ("mid", 5)] {
        create_recipe(&app, &token, json!({ "title": title, "likeCount": likes })).await;
    }

    let (status, top) = app.get("/api/recipe/top", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = top["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["high", "mid", "low"]);
}

#[tokio::test]
async fn invalid_path_id_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/recipe/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
