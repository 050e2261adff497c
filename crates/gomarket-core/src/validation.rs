//! # Validation Module
//!
//! Checks applied to line items restored from storage.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: serde (shape)                                                │
//! │  ├── Every field present, right JSON type                              │
//! │  └── quantity fits u32 (negative numbers fail here)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (cart invariants)                                │
//! │  ├── id non-empty                                                      │
//! │  ├── id unique within the cart                                         │
//! │  ├── quantity >= 1                                                     │
//! │  └── price >= 0                                                        │
//! │                                                                         │
//! │  Anything failing either layer is treated as "no stored cart".         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::LineItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a single line item.
///
/// ## Example
/// ```rust
/// use gomarket_core::{validation::validate_line_item, LineItem, Money};
///
/// let item = LineItem {
///     id: "p-1".into(),
///     title: "Mug".into(),
///     image_url: "mug.png".into(),
///     price: Money::from_cents(1250),
///     quantity: 0,
/// };
/// assert!(validate_line_item(&item).is_err());
/// ```
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if item.quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
            id: item.id.clone(),
        });
    }

    if item.price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
            id: item.id.clone(),
        });
    }

    Ok(())
}

/// Validates a full sequence of line items, including id uniqueness.
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_line_item(item)?;

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: item.id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn item(id: &str, quantity: u32, price_cents: i64) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: format!("Item {id}"),
            image_url: format!("{id}.png"),
            price: Money::from_cents(price_cents),
            quantity,
        }
    }

    #[test]
    fn test_valid_items() {
        let items = vec![item("a", 1, 0), item("b", 7, 1990)];
        assert!(validate_line_items(&items).is_ok());
        assert!(validate_line_items(&[]).is_ok());
    }

    #[test]
    fn test_blank_id() {
        assert_eq!(
            validate_line_item(&item("  ", 1, 100)),
            Err(ValidationError::Required {
                field: "id".to_string()
            })
        );
    }

    #[test]
    fn test_zero_quantity() {
        assert!(matches!(
            validate_line_item(&item("a", 0, 100)),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_negative_price() {
        assert!(matches!(
            validate_line_item(&item("a", 1, -1)),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids() {
        let items = vec![item("a", 1, 100), item("b", 1, 100), item("a", 2, 100)];
        assert_eq!(
            validate_line_items(&items),
            Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: "a".to_string()
            })
        );
    }
}
