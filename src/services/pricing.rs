//! Price totals for a configuration.

use serde::Serialize;

use crate::models::{Configuration, ProductType};
use crate::services::catalog::Catalog;

/// One priced row of the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    /// Catalog product id
    pub product_id: String,
    /// Display name
    pub name: String,
    /// How many times the product appears
    pub quantity: u32,
    /// Price of one unit
    pub unit_price: f64,
    /// `unit_price * quantity`
    pub subtotal: f64,
}

/// Derived totals for a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PriceBreakdown {
    /// Selected pegboard, if it is in the catalog
    pub pegboard: Option<LineItem>,
    /// Accessories grouped by product, in first-placement order
    pub accessories: Vec<LineItem>,
    /// Referenced product ids that are absent from the catalog or have the
    /// wrong type for their slot
    pub missing_product_ids: Vec<String>,
    /// Number of placed accessories (including missing ones)
    pub accessory_count: usize,
    /// Grand total
    pub total: f64,
}

impl PriceBreakdown {
    /// Whether every referenced product was priced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_product_ids.is_empty()
    }

    /// Total rounded to cents with a currency symbol, e.g. `€54.50`.
    #[must_use]
    pub fn formatted_total(&self, currency_symbol: &str) -> String {
        format!("{currency_symbol}{:.2}", self.total)
    }
}

/// Prices a configuration against the catalog.
///
/// Unknown product ids contribute nothing to the total and are listed in
/// [`PriceBreakdown::missing_product_ids`] instead of failing. An accessory
/// id in the pegboard slot, or a pegboard id among the accessories, counts
/// as unknown.
#[must_use]
pub fn price_configuration(configuration: &Configuration, catalog: &Catalog) -> PriceBreakdown {
    let mut breakdown = PriceBreakdown {
        accessory_count: configuration.accessories.len(),
        ..PriceBreakdown::default()
    };

    if let Some(pegboard_id) = &configuration.pegboard_id {
        match catalog.get_typed(pegboard_id, ProductType::Pegboard) {
            Ok(product) => {
                breakdown.pegboard = Some(LineItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    quantity: 1,
                    unit_price: product.price,
                    subtotal: product.price,
                });
            }
            Err(_) => breakdown.missing_product_ids.push(pegboard_id.clone()),
        }
    }

    for placement in &configuration.accessories {
        let id = &placement.accessory_id;

        let Ok(product) = catalog.get_typed(id, ProductType::Accessory) else {
            if !breakdown.missing_product_ids.contains(id) {
                breakdown.missing_product_ids.push(id.clone());
            }
            continue;
        };

        match breakdown.accessories.iter_mut().find(|item| &item.product_id == id) {
            Some(item) => {
                item.quantity += 1;
                item.subtotal = item.unit_price * f64::from(item.quantity);
            }
            None => breakdown.accessories.push(LineItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: 1,
                unit_price: product.price,
                subtotal: product.price,
            }),
        }
    }

    breakdown.total = breakdown.pegboard.as_ref().map_or(0.0, |item| item.subtotal)
        + breakdown.accessories.iter().map(|item| item.subtotal).sum::<f64>();

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlacedAccessory, Product, Vector3};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::pegboard("P1", "Board 60", 40.0),
            Product::accessory("A1", "Shelf", 12.0),
            Product::accessory("A2", "Hook", 2.5),
        ])
        .unwrap()
    }

    fn placed(id: &str) -> PlacedAccessory {
        PlacedAccessory::new(id, Vector3::default())
    }

    #[test]
    fn test_empty_configuration_costs_nothing() {
        let breakdown = price_configuration(&Configuration::new(), &catalog());
        assert!(breakdown.pegboard.is_none());
        assert!(breakdown.accessories.is_empty());
        assert!(breakdown.total.abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_and_grouping() {
        let config = Configuration {
            pegboard_id: Some("P1".to_string()),
            accessories: vec![placed("A2"), placed("A1"), placed("A2")],
            name: None,
        };
        let breakdown = price_configuration(&config, &catalog());

        assert!((breakdown.total - 57.0).abs() < 1e-9);
        assert_eq!(breakdown.accessory_count, 3);
        assert_eq!(breakdown.accessories[0].product_id, "A2");
        assert_eq!(breakdown.accessories[0].quantity, 2);
        assert!((breakdown.accessories[0].subtotal - 5.0).abs() < 1e-9);
        assert_eq!(breakdown.accessories[1].product_id, "A1");
        assert!(breakdown.is_complete());
        assert_eq!(breakdown.formatted_total("$"), "$57.00");
    }

    #[test]
    fn test_missing_products_are_flagged_not_fatal() {
        let config = Configuration {
            pegboard_id: Some("P1".to_string()),
            accessories: vec![placed("A1"), placed("GONE"), placed("GONE")],
            name: None,
        };
        let breakdown = price_configuration(&config, &catalog());

        assert!((breakdown.total - 52.0).abs() < 1e-9);
        assert_eq!(breakdown.missing_product_ids, vec!["GONE"]);
        assert_eq!(breakdown.accessory_count, 3);
        assert!(!breakdown.is_complete());
    }

    #[test]
    fn test_missing_pegboard_prices_zero() {
        let config = Configuration {
            pegboard_id: Some("P404".to_string()),
            accessories: vec![placed("A1")],
            name: None,
        };
        let breakdown = price_configuration(&config, &catalog());
        assert!(breakdown.pegboard.is_none());
        assert!((breakdown.total - 12.0).abs() < 1e-9);
        assert_eq!(breakdown.missing_product_ids, vec!["P404"]);
    }

    #[test]
    fn test_mistyped_ids_are_not_priced() {
        let config = Configuration {
            pegboard_id: Some("A1".to_string()),
            accessories: vec![placed("P1"), placed("A2")],
            name: None,
        };
        let breakdown = price_configuration(&config, &catalog());

        assert!(breakdown.pegboard.is_none());
        assert_eq!(breakdown.accessories.len(), 1);
        assert_eq!(breakdown.accessories[0].product_id, "A2");
        assert!((breakdown.total - 2.5).abs() < 1e-9);
        assert_eq!(breakdown.missing_product_ids, vec!["A1", "P1"]);
    }
}
