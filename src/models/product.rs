//! Catalog products: pegboards and the accessories that hang on them.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Product kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// A board accessories are mounted on
    Pegboard,
    /// Something that hangs on a pegboard
    Accessory,
}

impl ProductType {
    /// Parses a product type slug (`pegboard`/`pegboards`, `accessory`/`accessories`).
    ///
    /// # Errors
    ///
    /// Returns an error for any other value.
    pub fn from_slug(slug: &str) -> Result<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "pegboard" | "pegboards" => Ok(Self::Pegboard),
            "accessory" | "accessories" => Ok(Self::Accessory),
            other => anyhow::bail!("Unknown product type '{other}' (expected pegboard or accessory)"),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pegboard => write!(f, "pegboard"),
            Self::Accessory => write!(f, "accessory"),
        }
    }
}

/// Physical size of a product in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Extent along X
    pub width: f64,
    /// Extent along Y
    pub height: f64,
    /// Extent along Z
    pub depth: f64,
}

impl Dimensions {
    /// Creates a new set of dimensions.
    #[must_use]
    pub const fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }
}

/// A catalog entry.
///
/// # Validation
///
/// - ID and name must be non-empty
/// - Price must be finite and not negative
/// - Accessories must carry a compatibility set (possibly empty, meaning
///   "fits every pegboard")
/// - Pegboards must not carry a compatibility set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable unique identifier
    pub id: String,
    /// Pegboard or accessory
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Display name
    pub name: String,
    /// URL of the 3D asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_reference: Option<String>,
    /// Physical size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Pegboards this accessory fits (accessories only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_pegboard_ids: Option<BTreeSet<String>>,
    /// Unit price
    pub price: f64,
    /// Category used by the accessory filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Creates a pegboard product.
    pub fn pegboard(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            product_type: ProductType::Pegboard,
            name: name.into(),
            model_reference: None,
            dimensions: None,
            compatible_pegboard_ids: None,
            price,
            category: None,
        }
    }

    /// Creates an accessory that fits every pegboard.
    pub fn accessory(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            product_type: ProductType::Accessory,
            name: name.into(),
            model_reference: None,
            dimensions: None,
            compatible_pegboard_ids: Some(BTreeSet::new()),
            price,
            category: None,
        }
    }

    /// Restricts an accessory to the given pegboards.
    #[must_use]
    pub fn with_compatible<I, S>(mut self, pegboard_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible_pegboard_ids = Some(pegboard_ids.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the filter category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the 3D asset URL.
    #[must_use]
    pub fn with_model(mut self, url: impl Into<String>) -> Self {
        self.model_reference = Some(url.into());
        self
    }

    /// Sets the physical size.
    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Returns true for pegboards.
    #[must_use]
    pub fn is_pegboard(&self) -> bool {
        self.product_type == ProductType::Pegboard
    }

    /// Returns true for accessories.
    #[must_use]
    pub fn is_accessory(&self) -> bool {
        self.product_type == ProductType::Accessory
    }

    /// Whether this accessory may be placed on the given pegboard.
    ///
    /// An empty compatibility set fits every pegboard. Pegboards are never
    /// compatible with anything.
    #[must_use]
    pub fn is_compatible_with(&self, pegboard_id: &str) -> bool {
        match (&self.product_type, &self.compatible_pegboard_ids) {
            (ProductType::Accessory, Some(ids)) => ids.is_empty() || ids.contains(pegboard_id),
            _ => false,
        }
    }

    /// Whether this accessory fits every pegboard.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.is_accessory()
            && self
                .compatible_pegboard_ids
                .as_ref()
                .is_some_and(BTreeSet::is_empty)
    }

    /// Validates the product invariants.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            anyhow::bail!("Product ID cannot be empty");
        }

        if self.name.trim().is_empty() {
            anyhow::bail!("Product '{}' has an empty name", self.id);
        }

        if !self.price.is_finite() || self.price < 0.0 {
            anyhow::bail!(
                "Product '{}' has an invalid price: {}",
                self.id,
                self.price
            );
        }

        match self.product_type {
            ProductType::Accessory if self.compatible_pegboard_ids.is_none() => {
                anyhow::bail!(
                    "Accessory '{}' must declare compatible_pegboard_ids (use [] for all pegboards)",
                    self.id
                );
            }
            ProductType::Pegboard if self.compatible_pegboard_ids.is_some() => {
                anyhow::bail!(
                    "Pegboard '{}' cannot declare compatible_pegboard_ids",
                    self.id
                );
            }
            _ => {}
        }

        if let Some(dims) = &self.dimensions {
            let values = [dims.width, dims.height, dims.depth];
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                anyhow::bail!("Product '{}' has invalid dimensions", self.id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatibility_rules() {
        let universal = Product::accessory("A0", "Hook", 2.0);
        let restricted = Product::accessory("A1", "Shelf", 10.0).with_compatible(["P1"]);
        let board = Product::pegboard("P1", "Board", 40.0);

        assert!(universal.is_compatible_with("P1"));
        assert!(universal.is_compatible_with("anything"));
        assert!(restricted.is_compatible_with("P1"));
        assert!(!restricted.is_compatible_with("P2"));
        assert!(!board.is_compatible_with("P1"));
        assert!(universal.is_universal());
        assert!(!restricted.is_universal());
    }

    #[test]
    fn test_validate_type_invariants() {
        let mut accessory = Product::accessory("A1", "Shelf", 10.0);
        assert!(accessory.validate().is_ok());
        accessory.compatible_pegboard_ids = None;
        assert!(accessory.validate().is_err());

        let mut board = Product::pegboard("P1", "Board", 40.0);
        assert!(board.validate().is_ok());
        board.compatible_pegboard_ids = Some(BTreeSet::new());
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_validate_fields() {
        assert!(Product::pegboard("", "Board", 1.0).validate().is_err());
        assert!(Product::pegboard("P1", " ", 1.0).validate().is_err());
        assert!(Product::pegboard("P1", "Board", -1.0).validate().is_err());
        assert!(Product::pegboard("P1", "Board", f64::NAN).validate().is_err());
        assert!(Product::pegboard("P1", "Board", 1.0)
            .with_dimensions(Dimensions::new(1.0, -2.0, 0.1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_deserialize_uses_type_field() {
        let json = r#"{
            "id": "A1",
            "type": "accessory",
            "name": "Shelf",
            "price": 12.5,
            "compatible_pegboard_ids": ["P1", "P2"],
            "category": "shelves"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_type, ProductType::Accessory);
        assert_eq!(product.compatible_pegboard_ids.as_ref().unwrap().len(), 2);
        assert_eq!(product.category.as_deref(), Some("shelves"));
    }

    #[test]
    fn test_product_type_from_slug() {
        assert_eq!(ProductType::from_slug("Pegboards").unwrap(), ProductType::Pegboard);
        assert_eq!(ProductType::from_slug("accessory").unwrap(), ProductType::Accessory);
        assert!(ProductType::from_slug("shelf").is_err());
    }
}
