//! Product catalog loading and lookup.
//!
//! The catalog is fetched once per session from a host-provided
//! [`CatalogSource`] and treated as read-only afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::error::ConfiguratorError;
use crate::models::{Product, ProductType};

/// Host-provided source of catalog data.
pub trait CatalogSource: Send + Sync {
    /// Fetches every product. A client calls this again only after a failed fetch.
    fn fetch(&self) -> Result<Vec<Product>>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Catalog file contents: either a bare product array or `{ "products": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

/// Reads the catalog from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the catalog file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileCatalog {
    fn fetch(&self) -> Result<Vec<Product>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read catalog file: {}", self.path.display()))?;

        let document: CatalogDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", self.path.display()))?;

        Ok(match document {
            CatalogDocument::Bare(products) | CatalogDocument::Wrapped { products } => products,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory catalog source.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// Wraps a fixed product list.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl CatalogSource for StaticCatalog {
    fn fetch(&self) -> Result<Vec<Product>> {
        Ok(self.products.clone())
    }

    fn describe(&self) -> String {
        format!("static catalog ({} products)", self.products.len())
    }
}

/// Validated, read-only product list with an id index.
///
/// Products keep the order in which the source returned them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting invalid products and duplicate ids.
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let mut index = HashMap::with_capacity(products.len());

        for (position, product) in products.iter().enumerate() {
            product.validate()?;
            if index.insert(product.id.clone(), position).is_some() {
                anyhow::bail!("Duplicate product id in catalog: {}", product.id);
            }
        }

        Ok(Self { products, index })
    }

    /// All products of one type, in catalog order.
    #[must_use]
    pub fn list(&self, product_type: ProductType) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.product_type == product_type)
            .collect()
    }

    /// Every product in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks up one product.
    pub fn get(&self, id: &str) -> Result<&Product, ConfiguratorError> {
        self.find(id)
            .ok_or_else(|| ConfiguratorError::product_not_found(id))
    }

    /// Looks up one product, returning `None` when absent.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.index.get(id).map(|&i| &self.products[i])
    }

    /// Looks up a product and checks its type.
    pub fn get_typed(
        &self,
        id: &str,
        product_type: ProductType,
    ) -> Result<&Product, ConfiguratorError> {
        match self.find(id) {
            Some(product) if product.product_type == product_type => Ok(product),
            _ => Err(ConfiguratorError::product_not_found(id)),
        }
    }

    /// Distinct accessory categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .filter(|p| p.is_accessory())
            .filter_map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true when the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Fetch-once, cache-for-the-session catalog client.
pub struct ProductCatalogClient {
    source: Arc<dyn CatalogSource>,
    cache: Mutex<Option<Arc<Catalog>>>,
}

impl ProductCatalogClient {
    /// Creates a client over an injected source.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(None),
        }
    }

    /// Convenience constructor for a catalog JSON file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonFileCatalog::new(path)))
    }

    fn cache(&self) -> MutexGuard<'_, Option<Arc<Catalog>>> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a consistent cache.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached catalog, fetching it on first use.
    ///
    /// Concurrent first callers wait for a single fetch. A failed fetch is
    /// not cached, so the next call tries again.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        let mut cache = self.cache();
        if let Some(catalog) = cache.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(load_catalog(self.source.as_ref())?);
        *cache = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Whether the catalog has already been fetched.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cache().is_some()
    }

    /// All products of one type.
    pub fn list(&self, product_type: ProductType) -> Result<Vec<Product>> {
        Ok(self
            .catalog()?
            .list(product_type)
            .into_iter()
            .cloned()
            .collect())
    }

    /// One product by id. Missing ids surface as [`ConfiguratorError::NotFound`].
    pub fn get(&self, id: &str) -> Result<Product> {
        let catalog = self.catalog()?;
        let product = catalog.get(id)?;
        Ok(product.clone())
    }
}

/// Fetches and validates a catalog from a source.
pub fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog> {
    debug!("Fetching catalog from {}", source.describe());
    let products = source
        .fetch()
        .with_context(|| format!("Failed to fetch catalog from {}", source.describe()))?;
    let catalog = Catalog::new(products)?;
    info!(
        pegboards = catalog.list(ProductType::Pegboard).len(),
        accessories = catalog.list(ProductType::Accessory).len(),
        "Catalog loaded"
    );
    Ok(catalog)
}
