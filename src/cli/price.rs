//! Price a saved configuration.

use crate::cli::common::{
    load_settings, open_catalog, open_persistence, print_json, CliError, CliResult,
};
use crate::services::pricing::{price_configuration, PriceBreakdown};
use clap::Args;
use std::path::PathBuf;

/// Price a saved configuration against the catalog
#[derive(Debug, Clone, Args)]
pub struct PriceArgs {
    /// Saved configuration name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Catalog JSON file (defaults to the configured catalog)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Directory holding saved configurations
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Currency symbol for the human-readable total
    #[arg(long, value_name = "SYMBOL", default_value = "$")]
    pub currency: String,

    /// Output the breakdown as JSON
    #[arg(long)]
    pub json: bool,
}

impl PriceArgs {
    /// Execute the price command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let persistence = open_persistence(self.dir.as_deref(), &settings)?;
        let saved = persistence
            .load(&self.name)
            .map_err(|e| CliError::from_service("Failed to load configuration", &e))?;
        let catalog = open_catalog(self.catalog.as_deref(), &settings)?;

        let breakdown = price_configuration(&saved.configuration, &catalog);

        if self.json {
            print_json(&breakdown)
        } else {
            print_breakdown(&breakdown, &self.currency);
            Ok(())
        }
    }
}

fn print_breakdown(breakdown: &PriceBreakdown, currency: &str) {
    if let Some(pegboard) = &breakdown.pegboard {
        println!(
            "  {:<32} {:>4} x {:>10.2} = {:>10.2}",
            pegboard.name, pegboard.quantity, pegboard.unit_price, pegboard.subtotal
        );
    }
    for line in &breakdown.accessories {
        println!(
            "  {:<32} {:>4} x {:>10.2} = {:>10.2}",
            line.name, line.quantity, line.unit_price, line.subtotal
        );
    }
    println!();
    println!("Accessories: {}", breakdown.accessory_count);
    println!("Total:       {}", breakdown.formatted_total(currency));

    if !breakdown.is_complete() {
        println!();
        println!(
            "Warning: not in catalog (priced at 0): {}",
            breakdown.missing_product_ids.join(", ")
        );
    }
}
