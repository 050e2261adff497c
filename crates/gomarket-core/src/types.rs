//! # Domain Types
//!
//! Catalog and cart entry types shared by every layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   add_to_cart()    ┌─────────────────┐            │
//! │  │    Product      │ ─────────────────► │    LineItem     │            │
//! │  │  ─────────────  │   quantity = 1     │  ─────────────  │            │
//! │  │  id             │                    │  id             │            │
//! │  │  title          │                    │  title          │            │
//! │  │  image_url      │                    │  image_url      │            │
//! │  │  price (Money)  │                    │  price (Money)  │            │
//! │  └─────────────────┘                    │  quantity (≥1)  │            │
//! │                                         └─────────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names are snake_case on the wire (`image_url`), matching the
//! persisted cart written by earlier app versions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product offered to the cart.
///
/// Comes from the catalog layer; carries no quantity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Opaque identifier, stable across sessions.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Display image reference.
    pub image_url: String,

    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,
}

impl Product {
    /// Convenience constructor for a product priced in cents.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Money,
    ) -> Self {
        Product {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart with an associated quantity.
///
/// ## Invariants
/// - `quantity >= 1` at all times (the cart floors decrements at 1)
/// - `id` is unique within a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[ts(type = "number")]
    pub price: Money,
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item from a product with `quantity = 1`.
    pub fn from_product(product: &Product) -> Self {
        LineItem {
            id: product.id.clone(),
            title: product.title.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_from_product() {
        let product = Product::new("p-1", "Mug", "https://cdn/mug.png", Money::from_cents(1250));
        let item = LineItem::from_product(&product);

        assert_eq!(item.id, "p-1");
        assert_eq!(item.title, "Mug");
        assert_eq!(item.image_url, "https://cdn/mug.png");
        assert_eq!(item.price, product.price);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_line_item_wire_format() {
        let json = r#"{"id":"p-1","title":"Mug","image_url":"mug.png","price":12.5,"quantity":3}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.price.cents(), 1250);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.line_total().cents(), 3750);
        assert_eq!(serde_json::to_string(&item).unwrap(), json);
    }

    #[test]
    fn test_negative_quantity_is_rejected_on_decode() {
        let json = r#"{"id":"p-1","title":"Mug","image_url":"mug.png","price":1,"quantity":-2}"#;
        assert!(serde_json::from_str::<LineItem>(json).is_err());
    }
}
