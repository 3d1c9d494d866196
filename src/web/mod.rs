//! Web API module for the Blasti configurator.
//!
//! This module provides a REST API over the configurator core so a
//! storefront page (or any other host) can browse the catalog, price
//! configurations, manage saved configurations and render mounts.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/products` - List products (optional ?type=pegboard|accessory)
//! - `GET /api/products/{id}` - Get one product
//! - `GET /api/accessories` - Filtered accessory list (?search=&category=&pegboard=&show_all=)
//! - `GET /api/categories` - Distinct accessory categories
//! - `POST /api/price` - Price a configuration
//! - `GET /api/configurations` - List saved configurations
//! - `GET /api/configurations/{name}` - Load a saved configuration
//! - `PUT /api/configurations/{name}` - Save a configuration
//! - `DELETE /api/configurations/{name}` - Delete a saved configuration
//! - `GET /api/settings` - Current plugin settings
//! - `GET /mount` - Render the mount scaffold for shortcode attributes

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Settings;
use crate::constants::APP_NAME;
use crate::error::ConfiguratorError;
use crate::models::{
    CategoryFilter, CompatibilityMode, Configuration, FilterCriteria, Product, ProductType,
    SavedConfiguration,
};
use crate::mount::{render_error_state, render_scaffold, MountDescriptor, ShortcodeAttributes};
use crate::services::catalog::{Catalog, JsonFileCatalog, ProductCatalogClient};
use crate::services::filter::filter_accessories;
use crate::services::persistence::PersistenceClient;
use crate::services::pricing::{price_configuration, PriceBreakdown};
use crate::services::scene::SceneState;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Plugin settings (read-only while serving)
    settings: Arc<Settings>,
    /// Catalog client (fetch-once)
    catalog: Arc<ProductCatalogClient>,
    /// Saved configuration store
    persistence: PersistenceClient,
    /// Source of unique container ids for rendered mounts
    next_mount: Arc<AtomicU64>,
}

impl AppState {
    /// Creates state reading the catalog from a JSON file and saving
    /// configurations under `configurations_dir`.
    pub fn new(settings: Settings, catalog_path: PathBuf, configurations_dir: PathBuf) -> Self {
        Self::with_services(
            settings,
            Arc::new(ProductCatalogClient::new(Arc::new(JsonFileCatalog::new(
                catalog_path,
            )))),
            PersistenceClient::from_dir(configurations_dir),
        )
    }

    /// Creates state from already-built services.
    pub fn with_services(
        settings: Settings,
        catalog: Arc<ProductCatalogClient>,
        persistence: PersistenceClient,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            catalog,
            persistence,
            next_mount: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Returns the plugin settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Query parameters for the product list.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Product type slug (pegboard or accessory).
    #[serde(rename = "type")]
    pub product_type: Option<String>,
}

/// Product list response.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    /// Matching products in catalog order.
    pub products: Vec<Product>,
    /// Number of products returned.
    pub total: usize,
}

/// Query parameters for the accessory browser.
#[derive(Debug, Default, Deserialize)]
pub struct AccessoryQuery {
    /// Case-insensitive name search.
    pub search: Option<String>,
    /// Category ("all" or empty for every category).
    pub category: Option<String>,
    /// Currently selected pegboard.
    pub pegboard: Option<String>,
    /// Disable compatibility filtering.
    #[serde(default)]
    pub show_all: bool,
}

/// Accessory list response.
#[derive(Debug, Serialize)]
pub struct AccessoryListResponse {
    /// Accessories passing every filter, in catalog order.
    pub accessories: Vec<Product>,
    /// Number of accessories returned.
    pub total: usize,
}

/// Category list response.
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    /// Distinct accessory categories, sorted.
    pub categories: Vec<String>,
}

/// Saved configuration list response.
#[derive(Debug, Serialize)]
pub struct ConfigurationListResponse {
    /// Saved configurations, newest first.
    pub configurations: Vec<ConfigurationSummary>,
}

/// Summary of a saved configuration.
#[derive(Debug, Serialize)]
pub struct ConfigurationSummary {
    /// Stable record id.
    pub id: String,
    /// Saved name.
    pub name: String,
    /// Selected pegboard.
    pub pegboard_id: Option<String>,
    /// Number of placed accessories.
    pub accessory_count: usize,
    /// Last modified timestamp (RFC 3339 format).
    pub modified: String,
}

impl From<&SavedConfiguration> for ConfigurationSummary {
    fn from(saved: &SavedConfiguration) -> Self {
        Self {
            id: saved.id.to_string(),
            name: saved.name.clone(),
            pegboard_id: saved.configuration.pegboard_id.clone(),
            accessory_count: saved.configuration.accessories.len(),
            modified: saved.modified.to_rfc3339(),
        }
    }
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Machine-readable error kind for configurator rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            details: Some(details.into()),
        }
    }
}

impl From<&ConfiguratorError> for ApiError {
    fn from(error: &ConfiguratorError) -> Self {
        Self {
            error: error.to_string(),
            code: Some(error.code().to_string()),
            details: None,
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Error Mapping
// ============================================================================

/// HTTP status for a configurator rejection.
const fn status_for(error: &ConfiguratorError) -> StatusCode {
    match error {
        ConfiguratorError::NotFound { .. } => StatusCode::NOT_FOUND,
        ConfiguratorError::ValidationError(_) | ConfiguratorError::OutOfRange { .. } => {
            StatusCode::BAD_REQUEST
        }
        ConfiguratorError::IncompatibleProduct { .. }
        | ConfiguratorError::NoPegboardSelected
        | ConfiguratorError::LimitExceeded { .. } => StatusCode::CONFLICT,
        ConfiguratorError::RuntimeUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn domain_error(error: &ConfiguratorError) -> (StatusCode, Json<ApiError>) {
    (status_for(error), Json(ApiError::from(error)))
}

/// Maps a service error; anything that is not a rejection is a server error.
fn service_error(context: &str, error: &anyhow::Error) -> (StatusCode, Json<ApiError>) {
    match error.downcast_ref::<ConfiguratorError>() {
        Some(domain) => domain_error(domain),
        None => {
            warn!("{context}: {error:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::with_details(context, format!("{error:#}"))),
            )
        }
    }
}

fn load_catalog(state: &AppState) -> ApiResult<Arc<Catalog>> {
    state
        .catalog
        .catalog()
        .map_err(|e| service_error("Failed to load catalog", &e))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/products - List products, optionally of one type.
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<ProductListResponse>> {
    let product_type = query
        .product_type
        .as_deref()
        .filter(|slug| !slug.trim().is_empty())
        .map(ProductType::from_slug)
        .transpose()
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::with_details("Invalid product type", e.to_string())),
            )
        })?;

    let catalog = load_catalog(&state)?;
    let products: Vec<Product> = match product_type {
        Some(product_type) => catalog.list(product_type).into_iter().cloned().collect(),
        None => catalog.products().to_vec(),
    };

    Ok(Json(ProductListResponse {
        total: products.len(),
        products,
    }))
}

/// GET /api/products/{id} - Get one product.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let catalog = load_catalog(&state)?;
    let product = catalog.get(&id).map_err(|e| domain_error(&e))?;
    Ok(Json(product.clone()))
}

/// GET /api/accessories - Accessories passing the browser filters.
async fn list_accessories(
    State(state): State<AppState>,
    Query(query): Query<AccessoryQuery>,
) -> ApiResult<Json<AccessoryListResponse>> {
    let catalog = load_catalog(&state)?;

    let pegboard = query.pegboard.as_deref().filter(|id| !id.trim().is_empty());
    if let Some(id) = pegboard {
        catalog
            .get_typed(id, ProductType::Pegboard)
            .map_err(|e| domain_error(&e))?;
    }

    let criteria = FilterCriteria {
        search: query.search.clone().unwrap_or_default(),
        category: CategoryFilter::from_option(query.category.as_deref()),
        compatibility: if query.show_all {
            CompatibilityMode::ShowAll
        } else {
            CompatibilityMode::CompatibleOnly
        },
    };

    let accessories: Vec<Product> = filter_accessories(&catalog, &criteria, pegboard)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(AccessoryListResponse {
        total: accessories.len(),
        accessories,
    }))
}

/// GET /api/categories - Distinct accessory categories.
async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<CategoryListResponse>> {
    let catalog = load_catalog(&state)?;
    Ok(Json(CategoryListResponse {
        categories: catalog.categories(),
    }))
}

/// POST /api/price - Price a configuration.
async fn price(
    State(state): State<AppState>,
    Json(configuration): Json<Configuration>,
) -> ApiResult<Json<PriceBreakdown>> {
    let catalog = load_catalog(&state)?;
    Ok(Json(price_configuration(&configuration, &catalog)))
}

/// GET /api/configurations - List saved configurations.
async fn list_configurations(
    State(state): State<AppState>,
) -> ApiResult<Json<ConfigurationListResponse>> {
    let saved = state
        .persistence
        .list()
        .map_err(|e| service_error("Failed to list configurations", &e))?;

    Ok(Json(ConfigurationListResponse {
        configurations: saved.iter().map(ConfigurationSummary::from).collect(),
    }))
}

/// GET /api/configurations/{name} - Load a saved configuration.
async fn get_configuration(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<SavedConfiguration>> {
    let saved = state
        .persistence
        .load(&name)
        .map_err(|e| service_error("Failed to load configuration", &e))?;
    Ok(Json(saved))
}

/// PUT /api/configurations/{name} - Save a configuration.
///
/// The configuration is replayed against the catalog first, so only scenes
/// the configurator itself could have produced are stored.
async fn save_configuration(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(configuration): Json<Configuration>,
) -> ApiResult<Json<SavedConfiguration>> {
    let catalog = load_catalog(&state)?;
    let scene = SceneState::from_configuration(
        &configuration,
        &catalog,
        state.settings.general.max_accessories,
    )
    .map_err(|e| domain_error(&e))?;

    let saved = state
        .persistence
        .save(&name, &scene.to_configuration())
        .map_err(|e| service_error("Failed to save configuration", &e))?;

    Ok(Json(saved))
}

/// DELETE /api/configurations/{name} - Delete a saved configuration.
async fn delete_configuration(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .persistence
        .delete(&name)
        .map_err(|e| service_error("Failed to delete configuration", &e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/settings - Current plugin settings.
async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.as_ref().clone())
}

/// GET /mount - Render the mount scaffold for shortcode attributes.
///
/// Invalid attributes render the visible error state instead of a scaffold.
async fn render_mount(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let descriptor = ShortcodeAttributes::from_pairs(params)
        .and_then(|attrs| MountDescriptor::from_shortcode(&attrs, &state.settings))
        .map_err(|e| (status_for(&e), Html(render_error_state(&e))))?;

    let id = state.next_mount.fetch_add(1, Ordering::Relaxed);
    Ok(Html(render_scaffold(
        &descriptor,
        &format!("blasti-configurator-{id}"),
    )))
}

// ============================================================================
// Router & Server
// ============================================================================

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    // The storefront and the API are usually served from different origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Catalog endpoints
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/accessories", get(list_accessories))
        .route("/api/categories", get(list_categories))
        // Pricing
        .route("/api/price", post(price))
        // Saved configurations
        .route("/api/configurations", get(list_configurations))
        .route(
            "/api/configurations/{name}",
            get(get_configuration)
                .put(save_configuration)
                .delete(delete_configuration),
        )
        // Settings
        .route("/api/settings", get(get_settings))
        // Mount scaffold
        .route("/mount", get(render_mount))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Arguments
///
/// * `state` - Application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("Starting {APP_NAME} web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ConfiguratorError::product_not_found("X")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ConfiguratorError::LimitExceeded { max: 3 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ConfiguratorError::OutOfRange { index: 4, len: 1 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ConfiguratorError::RuntimeUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_service_error_downcasts() {
        let missing: anyhow::Error = ConfiguratorError::configuration_not_found("x").into();
        let (status, Json(body)) = service_error("Failed", &missing);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code.as_deref(), Some("not_found"));

        let io = anyhow::anyhow!("permission denied");
        let (status, Json(body)) = service_error("Failed to save", &io);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to save");
        assert_eq!(body.details.as_deref(), Some("permission denied"));
    }
}
