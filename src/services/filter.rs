//! Accessory list filtering.
//!
//! Filtering is a pure view over the catalog; it never touches the scene.

use crate::models::{CategoryFilter, CompatibilityMode, FilterCriteria, Product, ProductType};
use crate::services::catalog::Catalog;

/// Returns the accessories matching `criteria`, in catalog order.
///
/// With [`CompatibilityMode::CompatibleOnly`] and no pegboard selected only
/// accessories that fit every pegboard are shown.
#[must_use]
pub fn filter_accessories<'a>(
    catalog: &'a Catalog,
    criteria: &FilterCriteria,
    current_pegboard: Option<&str>,
) -> Vec<&'a Product> {
    let search = criteria.search.trim().to_lowercase();

    catalog
        .list(ProductType::Accessory)
        .into_iter()
        .filter(|product| search.is_empty() || product.name.to_lowercase().contains(&search))
        .filter(|product| match &criteria.category {
            CategoryFilter::All => true,
            CategoryFilter::Named(category) => product.category.as_deref() == Some(category),
        })
        .filter(|product| match criteria.compatibility {
            CompatibilityMode::ShowAll => true,
            CompatibilityMode::CompatibleOnly => match current_pegboard {
                Some(pegboard_id) => product.is_compatible_with(pegboard_id),
                None => product.is_universal(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::pegboard("P1", "Board 60", 40.0),
            Product::accessory("A1", "Wide Shelf", 12.0)
                .with_compatible(["P1"])
                .with_category("shelves"),
            Product::accessory("A2", "Screwdriver Hook", 2.5).with_category("hooks"),
            Product::accessory("A3", "Narrow shelf", 9.0)
                .with_compatible(["P2"])
                .with_category("shelves"),
            Product::accessory("A4", "Parts Bin", 6.0),
        ])
        .unwrap()
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = catalog();
        let criteria = FilterCriteria::default()
            .with_search("SHELF")
            .with_compatibility(CompatibilityMode::ShowAll);
        assert_eq!(ids(&filter_accessories(&catalog, &criteria, None)), vec!["A1", "A3"]);
    }

    #[test]
    fn test_category_exact_match() {
        let catalog = catalog();
        let criteria = FilterCriteria::default()
            .with_category("hooks")
            .with_compatibility(CompatibilityMode::ShowAll);
        assert_eq!(ids(&filter_accessories(&catalog, &criteria, Some("P1"))), vec!["A2"]);

        let partial = FilterCriteria::default()
            .with_category("hook")
            .with_compatibility(CompatibilityMode::ShowAll);
        assert!(filter_accessories(&catalog, &partial, Some("P1")).is_empty());
    }

    #[test]
    fn test_compatible_only_with_pegboard() {
        let catalog = catalog();
        let criteria = FilterCriteria::default();
        assert_eq!(
            ids(&filter_accessories(&catalog, &criteria, Some("P1"))),
            vec!["A1", "A2", "A4"]
        );
    }

    #[test]
    fn test_compatible_only_without_pegboard_shows_universal() {
        let catalog = catalog();
        let criteria = FilterCriteria::default();
        assert_eq!(ids(&filter_accessories(&catalog, &criteria, None)), vec!["A2", "A4"]);
    }

    #[test]
    fn test_show_all_ignores_compatibility() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_compatibility(CompatibilityMode::ShowAll);
        assert_eq!(filter_accessories(&catalog, &criteria, Some("P1")).len(), 4);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let catalog = catalog();
        let criteria = FilterCriteria::default().with_search("s");
        let first = ids(&filter_accessories(&catalog, &criteria, Some("P1")));
        let second = ids(&filter_accessories(&catalog, &criteria, Some("P1")));
        assert_eq!(first, second);
    }

    #[test]
    fn test_never_returns_pegboards() {
        let catalog = catalog();
        let criteria = FilterCriteria::default()
            .with_search("board")
            .with_compatibility(CompatibilityMode::ShowAll);
        assert!(filter_accessories(&catalog, &criteria, None).is_empty());
    }
}
