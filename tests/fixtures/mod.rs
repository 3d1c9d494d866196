//! Shared test fixtures for CLI and web API tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use blasti_configurator::constants::CONFIG_DIR_ENV;
use blasti_configurator::models::{Configuration, Dimensions, PlacedAccessory, Product, Vector3};
use blasti_configurator::services::PersistenceClient;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SMALL_BOARD: &str = "P-60";
pub const LARGE_BOARD: &str = "P-90";
pub const SHELF: &str = "A-SHELF";
pub const HOOK: &str = "A-HOOK";
pub const BIN: &str = "A-BIN";
pub const WIDE_SHELF: &str = "A-WIDE";

/// Deterministic catalog used across tests.
///
/// | id      | type      | price | category | fits        |
/// |---------|-----------|-------|----------|-------------|
/// | P-60    | pegboard  | 49.90 |          |             |
/// | P-90    | pegboard  | 69.90 |          |             |
/// | A-SHELF | accessory | 14.50 | shelves  | P-60        |
/// | A-HOOK  | accessory |  2.50 | hooks    | every board |
/// | A-BIN   | accessory |  8.00 | bins     | P-60, P-90  |
/// | A-WIDE  | accessory | 24.00 | shelves  | P-90        |
pub fn sample_products() -> Vec<Product> {
    vec![
        Product::pegboard(SMALL_BOARD, "Pegboard 60x40", 49.90)
            .with_dimensions(Dimensions::new(60.0, 40.0, 1.8))
            .with_model("https://cdn.example/models/p60.glb"),
        Product::pegboard(LARGE_BOARD, "Pegboard 90x60", 69.90)
            .with_dimensions(Dimensions::new(90.0, 60.0, 1.8)),
        Product::accessory(SHELF, "Small Shelf", 14.50)
            .with_category("shelves")
            .with_compatible([SMALL_BOARD]),
        Product::accessory(HOOK, "Single Hook", 2.50).with_category("hooks"),
        Product::accessory(BIN, "Storage Bin", 8.00)
            .with_category("bins")
            .with_compatible([SMALL_BOARD, LARGE_BOARD]),
        Product::accessory(WIDE_SHELF, "Wide Shelf", 24.00)
            .with_category("shelves")
            .with_compatible([LARGE_BOARD]),
    ]
}

/// A savable configuration on the small board: a shelf and two hooks.
pub fn sample_configuration() -> Configuration {
    Configuration {
        pegboard_id: Some(SMALL_BOARD.to_string()),
        accessories: vec![
            PlacedAccessory::new(SHELF, Vector3::new(10.0, 20.0, 0.0)),
            PlacedAccessory::new(HOOK, Vector3::new(5.0, 5.0, 0.0)),
            PlacedAccessory::new(HOOK, Vector3::new(15.0, 5.0, 0.0)),
        ],
        name: None,
    }
}

/// Writes products as a `{ "products": [...] }` catalog document.
pub fn write_catalog_file(products: &[Product], path: &Path) -> std::io::Result<()> {
    let document = serde_json::json!({ "products": products });
    fs::write(path, serde_json::to_string_pretty(&document)?)
}

/// Isolated config directory holding `catalog.json` and `configurations/`.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    /// Environment with the sample catalog in place.
    pub fn new() -> Self {
        let env = Self::empty();
        write_catalog_file(&sample_products(), &env.catalog_path())
            .expect("Failed to write catalog");
        env
    }

    /// Environment without a catalog file.
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.path().join("catalog.json")
    }

    pub fn configurations_dir(&self) -> PathBuf {
        self.dir.path().join("configurations")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join("settings.toml")
    }

    pub fn persistence(&self) -> PersistenceClient {
        PersistenceClient::from_dir(self.configurations_dir())
    }

    /// Saves `configuration` under `name` in the environment's store.
    pub fn save(&self, name: &str, configuration: &Configuration) {
        self.persistence()
            .save(name, configuration)
            .expect("Failed to save configuration");
    }

    /// Runs a binary with this environment's config directory.
    pub fn run(&self, bin: &str, args: &[&str]) -> Output {
        Command::new(bin)
            .env(CONFIG_DIR_ENV, self.config_dir())
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute command")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
