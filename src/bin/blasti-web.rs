//! Blasti Configurator Web Server Binary
//!
//! This binary starts the REST API that serves the product catalog, pricing,
//! saved configurations and mount scaffolds to the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 3001, catalog and configurations from the config dir)
//! blasti-web
//!
//! # Specify port, catalog and storage directory
//! blasti-web --port 8080 --catalog ./catalog.json --configurations ./saved
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blasti_configurator::config::Settings;
use blasti_configurator::web::{self, AppState};

/// Blasti Configurator Web Server - REST API for the storefront
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Catalog JSON file.
    /// Defaults to the configured catalog path, or catalog.json in the
    /// platform-specific config directory.
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Directory for saved configurations.
    /// Defaults to the configured directory, or configurations/ in the
    /// platform-specific config directory.
    #[arg(long)]
    configurations: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Resolves the configurations directory, creating it if it doesn't exist.
fn configurations_dir(args: &Args, settings: &Settings) -> anyhow::Result<PathBuf> {
    let dir = match &args.configurations {
        Some(path) => path.clone(),
        None => settings.configurations_dir()?,
    };

    if !dir.exists() {
        std::fs::create_dir_all(&dir).with_context(|| {
            format!("Failed to create configurations directory: {}", dir.display())
        })?;
    }

    Ok(dir)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings, falling back to defaults
    let settings = Settings::load().unwrap_or_else(|e| {
        tracing::warn!("Using default settings: {e:#}");
        Settings::default()
    });

    let catalog_path = match &args.catalog {
        Some(path) => path.clone(),
        None => settings.catalog_path()?,
    };
    let configurations = configurations_dir(&args, &settings)?;

    info!("Catalog: {}", catalog_path.display());
    info!("Configurations: {}", configurations.display());

    // Build socket address
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    // Start the server
    web::run_server(AppState::new(settings, catalog_path, configurations), addr).await
}
