//! # Cart Provider
//!
//! Owns one cart for the lifetime of a UI tree and makes it reachable from
//! the code running inside that tree.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartProvider Lifecycle                               │
//! │                                                                         │
//! │  mount(store, config)                                                  │
//! │    1. validate config                                                  │
//! │    2. load "{namespace}:cartProducts" (once)                           │
//! │    3. build CartState from the loaded cart (version 0)                 │
//! │    4. spawn PersistenceWorker                                          │
//! │                                                                         │
//! │  provider.scope(async { use_cart()?.increment("1"); .. })              │
//! │  provider.context()      ← explicit injection for spawned tasks        │
//! │                                                                         │
//! │  unmount()                                                             │
//! │    → flush latest snapshot, stop worker                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Scope Rules
//! The provider scope is a tokio task-local. It covers the future passed to
//! [`CartProvider::scope`] and nothing else; tasks started with
//! `tokio::spawn` from inside the scope do not inherit it and must be given a
//! [`CartContext`] directly.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use gomarket_core::{CartChange, CartTotals, LineItem, Product};
use gomarket_db::{Database, DbConfig, KeyValueStore};

use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::persistence::{CartPersistence, LoadSource, PersistenceHandle, PersistenceWorker};
use crate::state::{CartSnapshot, CartState};

tokio::task_local! {
    static CURRENT_CART: CartContext;
}

// =============================================================================
// Cart Context
// =============================================================================

/// What the UI sees: the current products and the three cart operations.
///
/// Cheap to clone; every clone talks to the same cart.
#[derive(Debug, Clone)]
pub struct CartContext {
    state: Arc<CartState>,
}

impl CartContext {
    /// Line items in insertion order.
    pub fn products(&self) -> Vec<LineItem> {
        self.state.products()
    }

    /// Adds `product` with quantity 1. A product already in the cart is
    /// left as it is.
    pub fn add_to_cart(&self, product: &Product) -> CartChange {
        self.state.add_to_cart(product)
    }

    /// Raises the quantity of `id` by one.
    pub fn increment(&self, id: &str) -> CartChange {
        self.state.increment(id)
    }

    /// Never drops a quantity below 1.
    pub fn decrement(&self, id: &str) -> CartChange {
        self.state.decrement(id)
    }

    /// Item count, total quantity and subtotal.
    pub fn totals(&self) -> CartTotals {
        self.state.totals()
    }

    /// The current cart with its version.
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.snapshot()
    }

    /// Receives every new snapshot; use it to re-render on change.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }
}

/// Returns the cart of the enclosing provider scope.
///
/// ## Errors
/// [`CartError::OutsideProvider`] when called outside
/// [`CartProvider::scope`] or [`CartProvider::sync_scope`].
///
/// ```rust,ignore
/// provider.scope(async {
///     let cart = use_cart()?;
///     cart.add_to_cart(&product);
///     Ok::<_, CartError>(())
/// }).await?;
/// ```
pub fn use_cart() -> CartResult<CartContext> {
    CURRENT_CART
        .try_with(CartContext::clone)
        .map_err(|_| CartError::OutsideProvider)
}

// =============================================================================
// Cart Provider
// =============================================================================

/// A mounted cart with its persistence worker.
pub struct CartProvider {
    context: CartContext,
    persistence: PersistenceHandle,
    worker: JoinHandle<()>,
    load_source: LoadSource,
}

impl CartProvider {
    /// Mounts a cart backed by `store`.
    ///
    /// Must be called inside a tokio runtime. Fails if the configuration is
    /// invalid or the store cannot be read; malformed stored data is not a
    /// failure and yields an empty cart.
    pub async fn mount(store: Arc<dyn KeyValueStore>, config: &CartConfig) -> CartResult<Self> {
        config.validate()?;

        let persistence = CartPersistence::new(store, config.storage_key());
        let loaded = persistence.load().await?;

        let state = Arc::new(CartState::from_loaded(loaded.cart));

        let (worker, handle) = PersistenceWorker::new(
            persistence,
            state.subscribe(),
            config.persistence.flush_on_shutdown,
        );
        let worker = tokio::spawn(worker.run());

        info!(
            key = %config.storage_key(),
            items = state.snapshot().cart.len(),
            source = ?loaded.source,
            "Cart provider mounted"
        );

        Ok(CartProvider {
            context: CartContext { state },
            persistence: handle,
            worker,
            load_source: loaded.source,
        })
    }

    /// Opens the SQLite database named by `config` and mounts a cart on it.
    pub async fn open(config: &CartConfig) -> CartResult<Self> {
        config.validate()?;

        let db_config = DbConfig::new(config.database_path()?)
            .max_connections(config.storage.max_connections)
            .connect_timeout(config.connect_timeout());
        let db = Database::new(db_config).await?;

        Self::mount(Arc::new(db), config).await
    }

    /// Returns a handle to this provider's cart.
    pub fn context(&self) -> CartContext {
        self.context.clone()
    }

    /// How the initial cart was obtained.
    pub fn load_source(&self) -> &LoadSource {
        &self.load_source
    }

    /// Runs `fut` with this cart available through [`use_cart`].
    pub async fn scope<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_CART.scope(self.context(), fut).await
    }

    /// Runs `f` with this cart available through [`use_cart`].
    pub fn sync_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT_CART.sync_scope(self.context(), f)
    }

    /// Waits until `version` (or something newer) has been written.
    ///
    /// See [`PersistenceHandle::flushed`].
    pub async fn flushed(&self, version: u64) -> CartResult<bool> {
        self.persistence.flushed(version).await
    }

    /// Flushes pending changes (if configured) and stops the worker.
    pub async fn unmount(self) -> CartResult<()> {
        self.persistence.shutdown().await?;

        self.worker.await.map_err(|e| {
            error!(error = %e, "Cart persistence worker panicked");
            CartError::WorkerStopped
        })?;

        let report = self.persistence.last_report();
        info!(
            version = report.version,
            outcome = ?report.outcome,
            "Cart provider unmounted"
        );
        Ok(())
    }
}
