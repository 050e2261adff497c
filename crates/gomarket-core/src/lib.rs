//! # gomarket-core: Pure Cart Logic for GoMarketplace
//!
//! This crate holds the cart rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    GoMarketplace Cart Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile UI (out of scope)                     │   │
//! │  │    Dashboard ──► Cart screen ──► Floating cart badge            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ use_cart()                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    gomarket-cart                                │   │
//! │  │    CartProvider, CartState, persistence worker                  │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼──────────────────┐   │
//! │  │   ★ gomarket-core (THIS CRATE) ★│  │   gomarket-db             │   │
//! │  │                                 │  │   key/value storage       │   │
//! │  │  ┌────────┐ ┌───────┐ ┌──────┐  │  │   (SQLite on device)      │   │
//! │  │  │ types  │ │ cart  │ │money │  │  └───────────────────────────┘   │
//! │  │  └────────┘ └───────┘ └──────┘  │                                   │
//! │  │  NO I/O • PURE FUNCTIONS        │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Product` and `LineItem`
//! - [`cart`] - `Cart` and its add / increment / decrement rules
//! - [`money`] - Money type with integer arithmetic
//! - [`validation`] - Invariant checks for restored carts
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, CartChange, Money, Product};
//!
//! let mut cart = Cart::new();
//! let mug = Product::new("p-1", "Mug", "mug.png", Money::from_cents(1250));
//!
//! assert_eq!(cart.add(&mug), CartChange::Added);
//! assert!(!cart.add(&mug).is_changed()); // second add is ignored
//! cart.increment("p-1");
//! assert_eq!(cart.totals().subtotal.cents(), 2500);
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange, CartTotals, UnchangedReason};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::{LineItem, Product};

/// Storage key suffix for the persisted cart.
///
/// The full key is `"{namespace}:{CART_STORAGE_SUFFIX}"`.
pub const CART_STORAGE_SUFFIX: &str = "cartProducts";

/// Namespace used by the shipped app, giving `@GoMarketPlace:cartProducts`.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "@GoMarketPlace";
