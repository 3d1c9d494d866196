//! Blasti Configurator Library
//!
//! This library provides the core of the Blasti pegboard configurator:
//! the product catalog, the scene state machine, accessory filtering,
//! pricing, saved configurations and the mount lifecycle that ties them to
//! a page.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod mount;
pub mod services;

#[cfg(feature = "web")]
pub mod web;
