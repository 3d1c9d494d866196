//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the numeric limits shared by the
//! settings layer and the scene state.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Blasti Configurator";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "blasti";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "BlastiConfigurator";

/// Environment variable that overrides the config directory (used by tests).
pub const CONFIG_DIR_ENV: &str = "BLASTI_CONFIG_DIR";

/// Default cap on placed accessories per configuration.
pub const DEFAULT_MAX_ACCESSORIES: u32 = 50;

/// Smallest allowed accessory cap.
pub const MIN_ACCESSORY_LIMIT: u32 = 1;

/// Largest allowed accessory cap.
pub const MAX_ACCESSORY_LIMIT: u32 = 100;

/// Default container width.
pub const DEFAULT_WIDTH: &str = "100%";

/// Default container height.
pub const DEFAULT_HEIGHT: &str = "600px";

/// Default text shown while the 3D scene is loading.
pub const DEFAULT_LOADING_TEXT: &str = "Loading 3D Configurator...";

/// CSS class always present on the mount container.
pub const CONTAINER_CLASS: &str = "blasti-configurator-container";
