//! # Cart State
//!
//! The live cart, published through a `tokio::sync::watch` channel.
//!
//! Every effective mutation produces a new [`CartSnapshot`] with a version one
//! higher than the last. Subscribers (the persistence worker, UI listeners)
//! always see the newest snapshot; intermediate ones may be skipped.
//!
//! ```text
//! version 0 ── loaded from storage (already persisted)
//! version 1 ── add_to_cart("1")
//! version 2 ── increment("1")
//!              decrement("1") at quantity 1 → no new version
//! ```

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use gomarket_core::{Cart, CartChange, CartTotals, LineItem, Product, UnchangedReason};

/// An immutable view of the cart at one version.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// Monotonic change counter. `0` is the state read from storage.
    pub version: u64,

    /// Cart contents at this version.
    pub cart: Arc<Cart>,

    /// When this version was produced.
    pub changed_at: DateTime<Utc>,
}

impl CartSnapshot {
    fn initial(cart: Cart) -> Self {
        CartSnapshot {
            version: 0,
            cart: Arc::new(cart),
            changed_at: Utc::now(),
        }
    }
}

/// Shared, observable cart state.
///
/// Cloning is not supported; share it through `Arc<CartState>`.
#[derive(Debug)]
pub struct CartState {
    tx: watch::Sender<CartSnapshot>,
}

impl CartState {
    /// Creates an empty cart at version 0.
    pub fn new() -> Self {
        Self::from_loaded(Cart::new())
    }

    /// Creates the state from a cart read from storage, at version 0.
    ///
    /// The persistence worker treats version 0 as already written. Versions
    /// only move forward after this, so a worker never skips a later change.
    pub fn from_loaded(cart: Cart) -> Self {
        debug!(items = cart.len(), "Creating cart state");
        let (tx, _rx) = watch::channel(CartSnapshot::initial(cart));
        CartState { tx }
    }

    /// Adds a product with quantity 1 unless its id is already present.
    pub fn add_to_cart(&self, product: &Product) -> CartChange {
        self.mutate(&product.id, |cart| cart.add(product))
    }

    /// Raises the quantity of `id` by one.
    pub fn increment(&self, id: &str) -> CartChange {
        self.mutate(id, |cart| cart.increment(id))
    }

    /// Lowers the quantity of `id` by one, stopping at 1.
    pub fn decrement(&self, id: &str) -> CartChange {
        self.mutate(id, |cart| cart.decrement(id))
    }

    /// Runs `op` under the channel's write lock and publishes only if it
    /// changed something.
    fn mutate<F>(&self, id: &str, op: F) -> CartChange
    where
        F: FnOnce(&mut Cart) -> CartChange,
    {
        let mut change = CartChange::Unchanged(UnchangedReason::NotInCart);
        let mut version = 0;

        self.tx.send_if_modified(|snapshot| {
            version = snapshot.version;

            let mut next = Cart::clone(&snapshot.cart);
            change = op(&mut next);
            if !change.is_changed() {
                return false;
            }

            snapshot.cart = Arc::new(next);
            snapshot.version += 1;
            snapshot.changed_at = Utc::now();
            version = snapshot.version;
            true
        });

        debug!(id, version, %change, "Cart mutation");
        change
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        self.tx.borrow().clone()
    }

    /// Current version number.
    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    /// Line items in insertion order.
    pub fn products(&self) -> Vec<LineItem> {
        self.tx.borrow().cart.items().to_vec()
    }

    /// Item count, total quantity and subtotal.
    pub fn totals(&self) -> CartTotals {
        self.tx.borrow().cart.totals()
    }

    /// Subscribes to future snapshots.
    ///
    /// The receiver starts with the current snapshot marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomarket_core::Money;

    fn product(id: &str, cents: i64) -> Product {
        Product::new(
            id,
            format!("Product {}", id),
            format!("https://img.example/{}.png", id),
            Money::from_cents(cents),
        )
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = CartState::new();

        assert!(state.products().is_empty());
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn test_mutations_bump_version() {
        let state = CartState::new();

        assert_eq!(state.add_to_cart(&product("1", 1000)), CartChange::Added);
        assert_eq!(state.version(), 1);

        assert_eq!(
            state.increment("1"),
            CartChange::QuantityChanged { from: 1, to: 2 }
        );
        assert_eq!(state.version(), 2);

        assert_eq!(
            state.decrement("1"),
            CartChange::QuantityChanged { from: 2, to: 1 }
        );
        assert_eq!(state.version(), 3);
        assert_eq!(state.products()[0].quantity, 1);
    }

    #[test]
    fn test_no_op_keeps_version() {
        let state = CartState::new();
        state.add_to_cart(&product("1", 1000));

        assert_eq!(
            state.add_to_cart(&product("1", 1000)),
            CartChange::Unchanged(UnchangedReason::AlreadyInCart)
        );
        assert_eq!(
            state.decrement("1"),
            CartChange::Unchanged(UnchangedReason::AtMinimumQuantity)
        );
        assert_eq!(
            state.increment("missing"),
            CartChange::Unchanged(UnchangedReason::NotInCart)
        );
        assert_eq!(
            state.decrement("missing"),
            CartChange::Unchanged(UnchangedReason::NotInCart)
        );

        assert_eq!(state.version(), 1);
    }

    #[test]
    fn test_from_loaded_starts_at_version_zero() {
        let mut loaded = Cart::new();
        loaded.add(&product("1", 1000));
        loaded.increment("1");
        let state = CartState::from_loaded(loaded);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.cart.len(), 1);
        assert_eq!(snapshot.cart.items()[0].quantity, 2);

        state.increment("1");
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn test_old_snapshot_is_unaffected() {
        let state = CartState::new();
        state.add_to_cart(&product("1", 1000));

        let before = state.snapshot();
        state.increment("1");

        assert_eq!(before.cart.items()[0].quantity, 1);
        assert_eq!(state.snapshot().cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_totals() {
        let state = CartState::new();
        state.add_to_cart(&product("1", 1000));
        state.add_to_cart(&product("2", 250));
        state.increment("2");

        let totals = state.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.subtotal, Money::from_cents(1500));
    }

    #[tokio::test]
    async fn test_subscriber_sees_only_effective_changes() {
        let state = CartState::new();
        let mut rx = state.subscribe();

        state.decrement("missing");
        assert!(!rx.has_changed().unwrap());

        state.add_to_cart(&product("1", 1000));
        assert!(rx.has_changed().unwrap());

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().version, 1);
    }
}
