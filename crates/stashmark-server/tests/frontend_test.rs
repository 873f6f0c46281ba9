//! Front-end routes: index page, embedded assets and service worker headers

use http::StatusCode;
use serde_json::Value;
use stashmark_core::MemoryBookmarkStore;
use stashmark_server::middleware::{NO_CACHE, REQUEST_ID_HEADER};
use stashmark_server::{build_app, ServerConfig, TestClient, TestRequest};
use std::sync::Arc;

fn client_with(config: ServerConfig) -> TestClient {
    let app = build_app(&config.normalized(), Arc::new(MemoryBookmarkStore::new())).unwrap();
    TestClient::new(app)
}

fn client() -> TestClient {
    client_with(ServerConfig::default())
}

#[tokio::test]
async fn test_service_worker_is_never_cached() {
    let response = client().get("/assets/js/sw.js").await;

    response
        .assert_status(StatusCode::OK)
        .assert_header("cache-control", NO_CACHE)
        .assert_header("service-worker-allowed", "/")
        .assert_header("content-type", "text/javascript; charset=utf-8");
    assert!(!response.body().is_empty());
}

#[tokio::test]
async fn test_service_worker_scope_follows_root_path() {
    let response = client_with(ServerConfig {
        root_path: "bookmarks".to_string(),
        ..Default::default()
    })
    .get("/assets/js/sw.js")
    .await;

    response.assert_header("service-worker-allowed", "/bookmarks/");
}

#[tokio::test]
async fn test_other_assets_are_cacheable() {
    let response = client().get("/assets/css/style.css").await;

    response
        .assert_status(StatusCode::OK)
        .assert_header("cache-control", "public, max-age=3600")
        .assert_header("content-type", "text/css; charset=utf-8");
    assert!(response.header("service-worker-allowed").is_none());
    assert!(response.header("etag").is_some());
}

#[tokio::test]
async fn test_asset_max_age_is_configurable() {
    let response = client_with(ServerConfig {
        asset_max_age: 60,
        ..Default::default()
    })
    .get("/assets/css/style.css")
    .await;

    response.assert_header("cache-control", "public, max-age=60");
}

#[tokio::test]
async fn test_conditional_request_is_not_modified() {
    let client = client();
    let first = client.get("/assets/css/style.css").await;
    let etag = first.header("etag").unwrap().to_string();

    let second = client
        .request(TestRequest::get("/assets/css/style.css").header("if-none-match", &etag))
        .await;

    second
        .assert_status(StatusCode::NOT_MODIFIED)
        .assert_header("etag", &etag);
    assert!(second.body().is_empty());
}

#[tokio::test]
async fn test_manifest_declares_share_target() {
    let response = client().get("/assets/manifest.webmanifest").await;

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "application/manifest+json");

    let manifest: Value = response.json().unwrap();
    let share_target = &manifest["share_target"];
    assert_eq!(share_target["method"], "POST");
    assert_eq!(share_target["enctype"], "application/x-www-form-urlencoded");
    assert_eq!(share_target["params"]["url"], "url");
    assert!(share_target["action"]
        .as_str()
        .unwrap()
        .ends_with("api/v1/pwa/share-target"));
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let response = client().get("/assets/js/missing.js").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn test_path_traversal_stays_inside_assets() {
    client()
        .get("/assets/../index.html")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_renders_root_path() {
    let response = client_with(ServerConfig {
        root_path: "/bookmarks".to_string(),
        ..Default::default()
    })
    .get("/")
    .await;

    response
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "text/html; charset=utf-8")
        .assert_body_contains(r#"<base href="/bookmarks/">"#)
        .assert_body_contains(env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let response = client().get("/nope").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.header(REQUEST_ID_HEADER).is_some());
    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], "not_found");
}
