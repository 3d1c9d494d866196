//! Service layer for business logic.
//!
//! This module contains the catalog client, the scene state machine and the
//! pure derivations (filtering, pricing) that drive the configurator panels,
//! plus persistence and the background loader.

pub mod catalog;
pub mod filter;
pub mod loader;
pub mod persistence;
pub mod pricing;
pub mod scene;

// Re-export commonly used types and functions
pub use catalog::{Catalog, CatalogSource, JsonFileCatalog, ProductCatalogClient, StaticCatalog};
pub use filter::filter_accessories;
pub use loader::{BackgroundLoader, LoadCompletion, LoadOutcome, RequestTicket};
pub use persistence::{
    ConfigurationStore, FileConfigurationStore, MemoryConfigurationStore, PersistenceClient,
};
pub use pricing::{price_configuration, LineItem, PriceBreakdown};
pub use scene::{ScenePhase, SceneState};
