//! Integration tests for the Blasti configurator Web API.
//!
//! These tests require the `web` feature to be enabled:
//! ```bash
//! cargo test --features web web_api
//! ```

#![cfg(feature = "web")]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use blasti_configurator::config::Settings;
use blasti_configurator::services::{
    MemoryConfigurationStore, PersistenceClient, ProductCatalogClient, StaticCatalog,
};
use blasti_configurator::web::{create_router, AppState};

mod fixtures;
use fixtures::*;

/// Creates a test AppState backed by the sample catalog and a temp store.
fn create_test_state() -> (AppState, TestEnv) {
    let env = TestEnv::new();
    let state = AppState::new(
        Settings::default(),
        env.catalog_path(),
        env.configurations_dir(),
    );
    (state, env)
}

/// Creates a test AppState with in-memory services and custom settings.
fn create_memory_state(settings: Settings) -> AppState {
    AppState::with_services(
        settings,
        Arc::new(ProductCatalogClient::new(Arc::new(StaticCatalog::new(
            sample_products(),
        )))),
        PersistenceClient::new(Arc::new(MemoryConfigurationStore::new())),
    )
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

/// Helper to make a GET request and get the response body as JSON.
async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Helper to make a GET request and get the response body as text.
async fn get_text(app: &axum::Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, String::from_utf8_lossy(&body).to_string())
}

/// Helper to send a JSON body with the given method.
async fn send_json(app: &axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn ids(products: &Value) -> Vec<&str> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (state, _env) = create_test_state();
    let app = create_router(state);

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

// ============================================================================
// Catalog Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_list_products() {
    let (state, _env) = create_test_state();
    let app = create_router(state);

    let (status, json) = get_json(&app, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 6);

    let (status, json) = get_json(&app, "/api/products?type=pegboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json["products"]), vec![SMALL_BOARD, LARGE_BOARD]);
}

#[tokio::test]
async fn test_list_products_invalid_type() {
    let (state, _env) = create_test_state();
    let app = create_router(state);

    let (status, json) = get_json(&app, "/api/products?type=lamp").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid product type");
}

#[tokio::test]
async fn test_get_product() {
    let (state, _env) = create_test_state();
    let app = create_router(state);

    let (status, json) = get_json(&app, "/api/products/A-SHELF").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Small Shelf");
    assert_eq!(json["compatible_pegboard_ids"], json!([SMALL_BOARD]));

    let (status, json) = get_json(&app, "/api/products/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn test_missing_catalog_file_is_server_error() {
    let env = TestEnv::empty();
    let app = create_router(AppState::new(
        Settings::default(),
        env.catalog_path(),
        env.configurations_dir(),
    ));

    let (status, json) = get_json(&app, "/api/products").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to load catalog");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_accessories_compatible_only_by_default() {
    let app = create_router(create_memory_state(Settings::default()));

    // No pegboard selected: only accessories that fit every board
    let (status, json) = get_json(&app, "/api/accessories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json["accessories"]), vec![HOOK]);

    let (_, json) = get_json(&app, "/api/accessories?pegboard=P-60").await;
    assert_eq!(ids(&json["accessories"]), vec![SHELF, HOOK, BIN]);
    assert_eq!(json["total"], 3);
}

#[tokio::test]
async fn test_accessories_filters_combine() {
    let app = create_router(create_memory_state(Settings::default()));

    let (_, json) = get_json(&app, "/api/accessories?show_all=true&search=shelf").await;
    assert_eq!(ids(&json["accessories"]), vec![SHELF, WIDE_SHELF]);

    let (_, json) =
        get_json(&app, "/api/accessories?pegboard=P-90&category=shelves&search=SHELF").await;
    assert_eq!(ids(&json["accessories"]), vec![WIDE_SHELF]);

    let (_, json) = get_json(&app, "/api/accessories?show_all=true&category=all").await;
    assert_eq!(json["total"], 4);
}

#[tokio::test]
async fn test_accessories_unknown_pegboard() {
    let app = create_router(create_memory_state(Settings::default()));

    let (status, _) = get_json(&app, "/api/accessories?pegboard=A-HOOK").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_categories() {
    let app = create_router(create_memory_state(Settings::default()));

    let (status, json) = get_json(&app, "/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["categories"], json!(["bins", "hooks", "shelves"]));
}

// ============================================================================
// Pricing Tests
// ============================================================================

#[tokio::test]
async fn test_price_configuration() {
    let app = create_router(create_memory_state(Settings::default()));
    let body = serde_json::to_value(sample_configuration()).unwrap();

    let (status, json) = send_json(&app, "POST", "/api/price", body).await;
    assert_eq!(status, StatusCode::OK);
    assert!((json["total"].as_f64().unwrap() - 69.40).abs() < 1e-9);
    assert_eq!(json["pegboard"]["product_id"], SMALL_BOARD);
    assert_eq!(json["accessories"][1]["quantity"], 2);
}

#[tokio::test]
async fn test_price_empty_configuration_is_zero() {
    let app = create_router(create_memory_state(Settings::default()));

    let (status, json) = send_json(&app, "POST", "/api/price", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0.0);
    assert_eq!(json["accessory_count"], 0);
}

#[tokio::test]
async fn test_price_unknown_products_flagged() {
    let app = create_router(create_memory_state(Settings::default()));
    let body = json!({
        "pegboard_id": "P-60",
        "accessories": [
            {"accessory_id": "retired", "position": {"x": 0.0, "y": 0.0, "z": 0.0}},
            {"accessory_id": "A-HOOK", "position": {"x": 1.0, "y": 0.0, "z": 0.0}}
        ]
    });

    let (status, json) = send_json(&app, "POST", "/api/price", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["missing_product_ids"], json!(["retired"]));
    assert!((json["total"].as_f64().unwrap() - 52.40).abs() < 1e-9);
}

// ============================================================================
// Saved Configuration Tests
// ============================================================================

#[tokio::test]
async fn test_configuration_round_trip() {
    let (state, env) = create_test_state();
    let app = create_router(state);
    let body = serde_json::to_value(sample_configuration()).unwrap();

    let (status, saved) = send_json(&app, "PUT", "/api/configurations/garage", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["name"], "garage");
    assert!(env.configurations_dir().join("garage.json").exists());

    let (status, json) = get_json(&app, "/api/configurations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["configurations"][0]["name"], "garage");
    assert_eq!(json["configurations"][0]["accessory_count"], 3);

    let (status, loaded) = get_json(&app, "/api/configurations/garage").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["id"], saved["id"]);
    assert_eq!(
        loaded["configuration"]["accessories"],
        serde_json::to_value(sample_configuration().accessories).unwrap()
    );
}

#[tokio::test]
async fn test_overwrite_keeps_identity() {
    let app = create_router(create_memory_state(Settings::default()));
    let body = serde_json::to_value(sample_configuration()).unwrap();

    let (_, first) = send_json(&app, "PUT", "/api/configurations/garage", body).await;

    let smaller = json!({
        "pegboard_id": "P-60",
        "accessories": [{"accessory_id": "A-BIN", "position": {"x": 0.0, "y": 0.0, "z": 0.0}}]
    });
    let (status, second) = send_json(&app, "PUT", "/api/configurations/garage", smaller).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["created"], second["created"]);
    assert_eq!(second["configuration"]["accessories"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_incompatible_configuration_conflict() {
    let app = create_router(create_memory_state(Settings::default()));
    let body = json!({
        "pegboard_id": "P-90",
        "accessories": [{"accessory_id": "A-SHELF", "position": {"x": 0.0, "y": 0.0, "z": 0.0}}]
    });

    let (status, json) = send_json(&app, "PUT", "/api/configurations/bad", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "incompatible_product");

    let (status, _) = get_json(&app, "/api/configurations/bad").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_save_respects_accessory_limit() {
    let mut settings = Settings::default();
    settings.general.max_accessories = 2;
    let app = create_router(create_memory_state(settings));
    let body = serde_json::to_value(sample_configuration()).unwrap();

    let (status, json) = send_json(&app, "PUT", "/api/configurations/full", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "limit_exceeded");
}

#[tokio::test]
async fn test_save_empty_configuration_rejected() {
    let app = create_router(create_memory_state(Settings::default()));

    let (status, json) = send_json(
        &app,
        "PUT",
        "/api/configurations/empty",
        json!({"pegboard_id": "P-60", "accessories": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");
}

#[tokio::test]
async fn test_delete_configuration() {
    let app = create_router(create_memory_state(Settings::default()));
    let body = serde_json::to_value(sample_configuration()).unwrap();
    send_json(&app, "PUT", "/api/configurations/old", body).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/configurations/old")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/configurations/old")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_configuration_name_traversal_rejected() {
    let app = create_router(create_memory_state(Settings::default()));

    let (status, _) = get_json(&app, "/api/configurations/..%2Fsettings").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Settings & Mount Tests
// ============================================================================

#[tokio::test]
async fn test_get_settings() {
    let mut settings = Settings::default();
    settings.general.max_accessories = 42;
    let app = create_router(create_memory_state(settings));

    let (status, json) = get_json(&app, "/api/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["general"]["max_accessories"], 42);
}

#[tokio::test]
async fn test_render_mount() {
    let app = create_router(create_memory_state(Settings::default()));

    let (status, html) = get_text(&app, "/mount?theme=dark&max_accessories=10").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("blasti-theme-dark"));
    assert!(html.contains(r#"data-max-accessories="10""#));

    let (_, second) = get_text(&app, "/mount").await;
    assert!(html.contains("blasti-configurator-1"));
    assert!(second.contains("blasti-configurator-2"));
}

#[tokio::test]
async fn test_render_mount_invalid_attributes_show_error_state() {
    let app = create_router(create_memory_state(Settings::default()));

    let (status, html) = get_text(&app, "/mount?max_accessories=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("data-error=\"validation_error\""));

    let (status, _) = get_text(&app, "/mount?bogus=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
