//! Render a configurator mount from shortcode attributes.

use crate::cli::common::{load_settings, open_persistence, print_json, CliError, CliResult};
use crate::config::Settings;
use crate::mount::{
    ConfiguratorMount, ContainerMetrics, HeadlessRuntime, MountDescriptor, MountEvent,
    MountServices, ShortcodeAttributes,
};
use crate::services::catalog::{JsonFileCatalog, ProductCatalogClient};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const PREVIEW_TIMEOUT: Duration = Duration::from_secs(10);

/// Render the mount scaffold for a set of shortcode attributes
#[derive(Debug, Clone, Args)]
pub struct MountArgs {
    /// Shortcode attributes as key=value (e.g. theme=dark max_accessories=20)
    #[arg(value_name = "KEY=VALUE")]
    pub attributes: Vec<String>,

    /// Raw shortcode attribute text (e.g. 'theme="dark" width="800px"')
    #[arg(long, value_name = "TEXT", conflicts_with = "attributes")]
    pub shortcode: Option<String>,

    /// Print the resolved descriptor as JSON instead of HTML
    #[arg(long)]
    pub json: bool,

    /// Boot the mount headlessly against the catalog and report its events
    #[arg(long)]
    pub preview: bool,

    /// Catalog JSON file for --preview (defaults to the configured catalog)
    #[arg(long, value_name = "FILE", requires = "preview")]
    pub catalog: Option<PathBuf>,

    /// Saved configuration to restore during --preview
    #[arg(long, value_name = "NAME", requires = "preview")]
    pub restore: Option<String>,

    /// Directory holding saved configurations
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

// JSON response types
#[derive(Debug, Serialize)]
struct PreviewResponse {
    container_id: String,
    ready: bool,
    events: Vec<String>,
    pegboard_id: Option<String>,
    accessory_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<f64>,
}

impl MountArgs {
    fn attributes(&self) -> CliResult<ShortcodeAttributes> {
        if let Some(text) = &self.shortcode {
            return Ok(ShortcodeAttributes::parse(text)?);
        }

        let pairs = self
            .attributes
            .iter()
            .map(|pair| {
                pair.split_once('=').ok_or_else(|| {
                    CliError::validation(format!("Invalid attribute '{pair}': expected KEY=VALUE"))
                })
            })
            .collect::<CliResult<Vec<_>>>()?;

        Ok(ShortcodeAttributes::from_pairs(
            pairs.into_iter().map(|(k, v)| (k, v.to_string())),
        )?)
    }

    /// Execute the mount command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let descriptor = MountDescriptor::from_shortcode(&self.attributes()?, &settings)?;

        if self.preview {
            return self.preview(descriptor, &settings);
        }

        if self.json {
            return print_json(&descriptor);
        }

        let mount = ConfiguratorMount::new(descriptor, self.services(&settings)?)?;
        print!("{}", mount.render());
        Ok(())
    }

    fn services(&self, settings: &Settings) -> CliResult<MountServices> {
        let catalog_path = match &self.catalog {
            Some(path) => path.clone(),
            None => settings
                .catalog_path()
                .map_err(|e| CliError::io(format!("Failed to resolve catalog path: {e:#}")))?,
        };

        Ok(MountServices {
            runtime: Arc::new(HeadlessRuntime::new()),
            catalog: Arc::new(ProductCatalogClient::new(Arc::new(JsonFileCatalog::new(
                catalog_path,
            )))),
            persistence: open_persistence(self.dir.as_deref(), settings)?,
        })
    }

    fn preview(&self, descriptor: MountDescriptor, settings: &Settings) -> CliResult<()> {
        let mut mount = ConfiguratorMount::new(descriptor, self.services(settings)?)?;

        mount.show(ContainerMetrics::new(800.0, 600.0));

        let mut events = mount.on_frame();
        events.extend(mount.settle(PREVIEW_TIMEOUT));

        if let Some(name) = &self.restore {
            mount.load(name)?;
            events.extend(mount.settle(PREVIEW_TIMEOUT));
        }

        for event in &events {
            match event {
                MountEvent::CatalogFailed(message) | MountEvent::RequestFailed(message) => {
                    return Err(CliError::io(message.clone()));
                }
                MountEvent::Rejected(error) => return Err(error.into()),
                _ => {}
            }
        }

        let response = PreviewResponse {
            container_id: mount.container_id().to_string(),
            ready: mount.controls_enabled(),
            events: events.iter().map(describe_event).collect(),
            pegboard_id: mount.scene().pegboard_id().map(str::to_string),
            accessory_count: mount.scene().placements().len(),
            total: mount.price().map(|price| price.total),
        };

        if self.json {
            return print_json(&response);
        }

        let status = if response.ready { "ready" } else { "not ready" };
        println!("Mount {} ({status})", response.container_id);
        for event in &response.events {
            println!("  - {event}");
        }
        println!(
            "Pegboard: {}",
            response.pegboard_id.as_deref().unwrap_or("(none)")
        );
        println!("Accessories: {}", response.accessory_count);
        if let Some(total) = response.total {
            println!("Total: {total:.2}");
        }

        Ok(())
    }
}

fn describe_event(event: &MountEvent) -> String {
    match event {
        MountEvent::Ready => "ready".to_string(),
        MountEvent::Failed(error) => format!("failed: {error}"),
        MountEvent::CatalogLoaded {
            pegboards,
            accessories,
        } => format!("catalog loaded: {pegboards} pegboards, {accessories} accessories"),
        MountEvent::CatalogFailed(message) => format!("catalog failed: {message}"),
        MountEvent::SceneChanged(price) => format!("scene changed: total {:.2}", price.total),
        MountEvent::AccessoriesRemoved(removed) => {
            format!("{} incompatible accessories removed", removed.len())
        }
        MountEvent::Rejected(error) => format!("rejected: {error}"),
        MountEvent::Saved { name } => format!("saved '{name}'"),
        MountEvent::Restored { name } => format!("restored '{name}'"),
        MountEvent::RequestFailed(message) => format!("request failed: {message}"),
    }
}
