//! # Cart
//!
//! The ordered collection of line items and its three mutations.
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Mutations                                     │
//! │                                                                         │
//! │  add(product)                                                          │
//! │    id already in cart ──► Unchanged(AlreadyInCart)  (qty NOT bumped)   │
//! │    otherwise          ──► push LineItem { quantity: 1 }  → Added       │
//! │                                                                         │
//! │  increment(id)                                                         │
//! │    id missing         ──► Unchanged(NotInCart)                         │
//! │    otherwise          ──► quantity + 1  → QuantityChanged              │
//! │                                                                         │
//! │  decrement(id)                                                         │
//! │    id missing         ──► Unchanged(NotInCart)                         │
//! │    quantity == 1      ──► Unchanged(AtMinimumQuantity)  (never removed)│
//! │    otherwise          ──► quantity - 1  → QuantityChanged              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of the no-op paths is an error: callers get a [`CartChange`] back and
//! can log it, but nothing is surfaced to the user.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{LineItem, Product};
use crate::validation::validate_line_items;

// =============================================================================
// Cart Change
// =============================================================================

/// Why a mutation left the cart untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedReason {
    /// `add` for an id that is already in the cart.
    AlreadyInCart,
    /// `increment`/`decrement` for an id that is not in the cart.
    NotInCart,
    /// `decrement` on an item whose quantity is already 1.
    AtMinimumQuantity,
    /// `increment` on an item whose quantity cannot grow further.
    AtMaximumQuantity,
}

/// Outcome of a single cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line item was appended.
    Added,
    /// An existing line item's quantity moved.
    QuantityChanged { from: u32, to: u32 },
    /// Nothing happened.
    Unchanged(UnchangedReason),
}

impl CartChange {
    /// Returns true if the cart content differs after the mutation.
    #[inline]
    pub fn is_changed(&self) -> bool {
        !matches!(self, CartChange::Unchanged(_))
    }
}

impl fmt::Display for CartChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartChange::Added => write!(f, "added"),
            CartChange::QuantityChanged { from, to } => write!(f, "quantity {from} -> {to}"),
            CartChange::Unchanged(UnchangedReason::AlreadyInCart) => {
                write!(f, "unchanged: already in cart")
            }
            CartChange::Unchanged(UnchangedReason::NotInCart) => write!(f, "unchanged: not in cart"),
            CartChange::Unchanged(UnchangedReason::AtMinimumQuantity) => {
                write!(f, "unchanged: at minimum quantity")
            }
            CartChange::Unchanged(UnchangedReason::AtMaximumQuantity) => {
                write!(f, "unchanged: at maximum quantity")
            }
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id`
/// - Every quantity is >= 1
/// - Insertion order is preserved; new items go last
///
/// ## Serialization
/// A cart is a bare JSON array of line items. Deserializing runs
/// [`validate_line_items`], so a decoded `Cart` always holds the invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product as a new line item with quantity 1.
    ///
    /// A product whose id is already present is ignored; the existing
    /// quantity is not touched.
    pub fn add(&mut self, product: &Product) -> CartChange {
        if self.get(&product.id).is_some() {
            return CartChange::Unchanged(UnchangedReason::AlreadyInCart);
        }

        self.items.push(LineItem::from_product(product));
        CartChange::Added
    }

    /// Increases the quantity of the matching line item by exactly one.
    pub fn increment(&mut self, id: &str) -> CartChange {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return CartChange::Unchanged(UnchangedReason::NotInCart);
        };

        let from = item.quantity;
        match from.checked_add(1) {
            Some(to) => {
                item.quantity = to;
                CartChange::QuantityChanged { from, to }
            }
            None => CartChange::Unchanged(UnchangedReason::AtMaximumQuantity),
        }
    }

    /// Decreases the quantity of the matching line item by one, never below 1.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return CartChange::Unchanged(UnchangedReason::NotInCart);
        };

        let from = item.quantity;
        if from <= 1 {
            return CartChange::Unchanged(UnchangedReason::AtMinimumQuantity);
        }

        item.quantity = from - 1;
        CartChange::QuantityChanged {
            from,
            to: item.quantity,
        }
    }

    /// Looks up a line item by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Σ unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Summary for the cart screen.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = ValidationError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        validate_line_items(&items)?;
        Ok(Cart { items })
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals summary for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    #[ts(type = "number")]
    pub total_quantity: u64,
    #[ts(type = "number")]
    pub subtotal: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.len(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
