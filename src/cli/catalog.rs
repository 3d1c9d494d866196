//! Catalog browsing commands.
//!
//! Provides commands to list products (with the accessory browser filters)
//! and to show a single product.

use crate::cli::common::{load_settings, open_catalog, print_json, CliError, CliResult};
use crate::models::{CategoryFilter, CompatibilityMode, FilterCriteria, Product, ProductType};
use crate::services::catalog::Catalog;
use crate::services::filter::filter_accessories;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Browse the product catalog
#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Catalog subcommand
    #[command(subcommand)]
    pub command: CatalogCommand,
}

/// Catalog subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum CatalogCommand {
    /// List pegboards and accessories
    List(ListProductsArgs),
    /// Show one product
    Show(ShowProductArgs),
}

/// List pegboards and accessories
#[derive(Debug, Clone, Args)]
pub struct ListProductsArgs {
    /// Catalog JSON file (defaults to the configured catalog)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Only list one product type (pegboard or accessory)
    #[arg(long = "type", value_name = "TYPE")]
    pub product_type: Option<String>,

    /// Case-insensitive accessory name search
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Accessory category ("all" for every category)
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Only list accessories compatible with this pegboard
    #[arg(long, value_name = "ID")]
    pub pegboard: Option<String>,

    /// Include accessories that do not fit --pegboard
    #[arg(long)]
    pub show_all: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show one product
#[derive(Debug, Clone, Args)]
pub struct ShowProductArgs {
    /// Product ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Catalog JSON file (defaults to the configured catalog)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

// JSON response types
#[derive(Debug, Serialize)]
struct ListProductsResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pegboards: Option<Vec<&'a Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accessories: Option<Vec<&'a Product>>,
    count: usize,
}

impl CatalogArgs {
    /// Execute the catalog command
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            CatalogCommand::List(args) => args.execute(),
            CatalogCommand::Show(args) => args.execute(),
        }
    }
}

impl ListProductsArgs {
    /// Builds the accessory filter from the flags.
    ///
    /// Compatibility filtering only applies when a pegboard is named.
    fn criteria(&self) -> FilterCriteria {
        let compatibility = if self.pegboard.is_some() && !self.show_all {
            CompatibilityMode::CompatibleOnly
        } else {
            CompatibilityMode::ShowAll
        };

        FilterCriteria {
            search: self.search.clone().unwrap_or_default(),
            category: CategoryFilter::from_option(self.category.as_deref()),
            compatibility,
        }
    }

    fn wanted_type(&self) -> CliResult<Option<ProductType>> {
        self.product_type
            .as_deref()
            .map(ProductType::from_slug)
            .transpose()
            .map_err(|e| CliError::validation(format!("{e}")))
    }

    /// Execute the list command
    pub fn execute(&self) -> CliResult<()> {
        let wanted = self.wanted_type()?;
        let settings = load_settings()?;
        let catalog = open_catalog(self.catalog.as_deref(), &settings)?;

        if let Some(pegboard) = &self.pegboard {
            catalog.get_typed(pegboard, ProductType::Pegboard)?;
        }

        let pegboards = (wanted != Some(ProductType::Accessory))
            .then(|| catalog.list(ProductType::Pegboard));
        let accessories = (wanted != Some(ProductType::Pegboard))
            .then(|| filter_accessories(&catalog, &self.criteria(), self.pegboard.as_deref()));

        let response = ListProductsResponse {
            count: pegboards.as_ref().map_or(0, Vec::len)
                + accessories.as_ref().map_or(0, Vec::len),
            pegboards,
            accessories,
        };

        if self.json {
            return print_json(&response);
        }

        if let Some(pegboards) = &response.pegboards {
            print_section("Pegboards", pegboards);
        }
        if let Some(accessories) = &response.accessories {
            print_section("Accessories", accessories);
        }

        Ok(())
    }
}

fn print_section(title: &str, products: &[&Product]) {
    if products.is_empty() {
        println!("No {} found.", title.to_lowercase());
        println!();
        return;
    }

    println!("{title} ({}):", products.len());
    println!();
    for product in products {
        println!(
            "  {:<16} {:<32} {:>10.2}  {}",
            product.id,
            product.name,
            product.price,
            product.category.as_deref().unwrap_or("-")
        );
    }
    println!();
}

impl ShowProductArgs {
    /// Execute the show command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let catalog = open_catalog(self.catalog.as_deref(), &settings)?;
        let product = catalog.get(&self.id)?;

        if self.json {
            return print_json(product);
        }

        print_product(product, &catalog);
        Ok(())
    }
}

fn print_product(product: &Product, catalog: &Catalog) {
    println!("{} ({})", product.name, product.id);
    println!("  Type:     {}", product.product_type);
    println!("  Price:    {:.2}", product.price);
    if let Some(category) = &product.category {
        println!("  Category: {category}");
    }
    if let Some(dimensions) = &product.dimensions {
        println!(
            "  Size:     {} x {} x {}",
            dimensions.width, dimensions.height, dimensions.depth
        );
    }
    if let Some(model) = &product.model_reference {
        println!("  Model:    {model}");
    }

    if product.is_accessory() {
        if product.is_universal() {
            println!("  Fits:     every pegboard");
        } else {
            let fits: Vec<&str> = catalog
                .list(ProductType::Pegboard)
                .into_iter()
                .filter(|pegboard| product.is_compatible_with(&pegboard.id))
                .map(|pegboard| pegboard.id.as_str())
                .collect();
            println!("  Fits:     {}", fits.join(", "));
        }
    }
}
