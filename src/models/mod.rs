//! Data models for products, placements, configurations and filters.
//!
//! This module contains the core data structures used throughout the application.
//! Models are designed to be independent of UI and business logic.

pub mod appearance;
pub mod configuration;
pub mod filter;
pub mod product;

// Re-export all model types
pub use appearance::{CssDimension, Theme};
pub use configuration::{Configuration, PlacedAccessory, SavedConfiguration, Vector3};
pub use filter::{CategoryFilter, CompatibilityMode, FilterCriteria};
pub use product::{Dimensions, Product, ProductType};
