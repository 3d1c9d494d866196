//! CLI command handlers for the Blasti configurator.
//!
//! This module provides headless, scriptable access to the catalog, saved
//! configurations, pricing, mount rendering and plugin settings.

pub mod catalog;
pub mod common;
pub mod mount;
pub mod price;
pub mod saved;
pub mod settings;

// Re-export types used by main.rs and tests
pub use catalog::CatalogArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use mount::MountArgs;
pub use price::PriceArgs;
pub use saved::SavedArgs;
pub use settings::SettingsArgs;
