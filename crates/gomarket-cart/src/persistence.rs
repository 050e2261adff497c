//! # Cart Persistence
//!
//! Moves the cart between [`CartState`](crate::state::CartState) and a
//! [`KeyValueStore`].
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Persistence Worker Flow                              │
//! │                                                                         │
//! │  CartState ──watch──► PersistenceWorker (one task, one writer)         │
//! │                             │                                           │
//! │                             ├─► borrow_and_update() newest snapshot    │
//! │                             ├─► skip if version <= last attempted      │
//! │                             ├─► store.set(key, json(cart))             │
//! │                             └─► publish WriteReport { version, .. }    │
//! │                                                                         │
//! │  Snapshots produced while a write is in flight collapse into one:     │
//! │  the next write always carries the newest cart, so a slow write can    │
//! │  never land after a newer one.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read Path
//! | Stored value         | Result                                  |
//! |----------------------|-----------------------------------------|
//! | missing / blank      | empty cart, [`LoadSource::Absent`]      |
//! | valid JSON array     | that cart, [`LoadSource::Restored`]     |
//! | anything else        | empty cart, [`LoadSource::Discarded`]   |
//! | store read error     | `Err(CartError::Storage)`               |

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use gomarket_core::Cart;
use gomarket_db::KeyValueStore;

use crate::error::{CartError, CartResult};
use crate::state::CartSnapshot;

// =============================================================================
// Load / Save
// =============================================================================

/// Where a loaded cart came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing was stored under the key.
    Absent,
    /// A valid cart was decoded.
    Restored,
    /// Something was stored but failed to decode; carries the reason.
    Discarded(String),
}

/// Result of reading the cart at startup.
#[derive(Debug, Clone)]
pub struct LoadedCart {
    pub cart: Cart,
    pub source: LoadSource,
}

/// Reads and writes the cart under a single key.
#[derive(Clone)]
pub struct CartPersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for CartPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPersistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CartPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        CartPersistence {
            store,
            key: key.into(),
        }
    }

    /// The storage key, e.g. `@GoMarketPlace:cartProducts`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored cart.
    ///
    /// Malformed data is logged and replaced by an empty cart; only a failing
    /// store is reported as an error.
    pub async fn load(&self) -> CartResult<LoadedCart> {
        let raw = self.store.get(&self.key).await?;

        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            debug!(key = %self.key, "No stored cart");
            return Ok(LoadedCart {
                cart: Cart::new(),
                source: LoadSource::Absent,
            });
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                info!(key = %self.key, items = cart.len(), "Restored cart from storage");
                Ok(LoadedCart {
                    cart,
                    source: LoadSource::Restored,
                })
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored cart is malformed, starting empty");
                Ok(LoadedCart {
                    cart: Cart::new(),
                    source: LoadSource::Discarded(e.to_string()),
                })
            }
        }
    }

    /// Writes the full cart as a JSON array.
    pub async fn save(&self, cart: &Cart) -> CartResult<()> {
        let json = serde_json::to_string(cart)?;
        self.store.set(&self.key, &json).await?;
        Ok(())
    }

    /// Deletes the stored cart.
    pub async fn clear(&self) -> CartResult<()> {
        self.store.remove(&self.key).await?;
        Ok(())
    }
}

// =============================================================================
// Write Reports
// =============================================================================

/// Outcome of one write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Failed,
}

/// The most recent write attempt made by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Snapshot version that was written (or failed to be).
    pub version: u64,
    pub outcome: WriteOutcome,
    pub at: DateTime<Utc>,
}

// =============================================================================
// Persistence Worker
// =============================================================================

/// Background task that saves every new cart snapshot.
pub struct PersistenceWorker {
    persistence: CartPersistence,

    /// Cart snapshots from `CartState`.
    snapshots: watch::Receiver<CartSnapshot>,

    /// Publishes the latest write attempt.
    reports: watch::Sender<WriteReport>,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,

    /// Highest version handed to the store so far.
    last_attempted: u64,

    flush_on_shutdown: bool,
}

/// Handle for controlling the persistence worker.
#[derive(Clone)]
pub struct PersistenceHandle {
    /// Shutdown sender.
    shutdown_tx: mpsc::Sender<()>,

    reports: watch::Receiver<WriteReport>,
}

impl PersistenceHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> CartResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| CartError::WorkerStopped)
    }

    /// Returns the most recent write report.
    pub fn last_report(&self) -> WriteReport {
        self.reports.borrow().clone()
    }

    /// Waits until a snapshot at or after `version` has been handed to the
    /// store.
    ///
    /// Returns whether that write succeeded. A version that is never produced
    /// waits until the worker stops, then fails with
    /// [`CartError::WorkerStopped`].
    pub async fn flushed(&self, version: u64) -> CartResult<bool> {
        let mut reports = self.reports.clone();
        reports
            .wait_for(|report| report.version >= version)
            .await
            .map(|report| report.outcome == WriteOutcome::Written)
            .map_err(|_| CartError::WorkerStopped)
    }
}

impl PersistenceWorker {
    /// Creates a worker and its handle.
    ///
    /// The snapshot current at subscription time counts as already stored.
    pub fn new(
        persistence: CartPersistence,
        snapshots: watch::Receiver<CartSnapshot>,
        flush_on_shutdown: bool,
    ) -> (Self, PersistenceHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let last_attempted = snapshots.borrow().version;
        let (reports_tx, reports_rx) = watch::channel(WriteReport {
            version: last_attempted,
            outcome: WriteOutcome::Written,
            at: Utc::now(),
        });

        let worker = PersistenceWorker {
            persistence,
            snapshots,
            reports: reports_tx,
            shutdown_rx,
            last_attempted,
            flush_on_shutdown,
        };

        let handle = PersistenceHandle {
            shutdown_tx,
            reports: reports_rx,
        };

        (worker, handle)
    }

    /// Runs the worker loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(key = %self.persistence.key(), "Cart persistence worker starting");

        loop {
            tokio::select! {
                biased;

                // Shutdown, or every handle dropped
                _ = self.shutdown_rx.recv() => {
                    if self.flush_on_shutdown {
                        self.persist_latest().await;
                    }
                    info!("Cart persistence worker shutting down");
                    break;
                }

                changed = self.snapshots.changed() => {
                    self.persist_latest().await;

                    if changed.is_err() {
                        debug!("Cart state dropped");
                        break;
                    }
                }
            }
        }

        info!("Cart persistence worker stopped");
    }

    /// Writes the newest snapshot if it has not been attempted yet.
    async fn persist_latest(&mut self) {
        let snapshot = self.snapshots.borrow_and_update().clone();
        if snapshot.version <= self.last_attempted {
            return;
        }
        self.last_attempted = snapshot.version;

        let outcome = match self.persistence.save(&snapshot.cart).await {
            Ok(()) => {
                debug!(
                    version = snapshot.version,
                    items = snapshot.cart.len(),
                    "Cart persisted"
                );
                WriteOutcome::Written
            }
            Err(e) => {
                // Not retried; the next mutation writes the full cart again
                error!(version = snapshot.version, error = %e, "Failed to persist cart");
                WriteOutcome::Failed
            }
        };

        self.reports.send_replace(WriteReport {
            version: snapshot.version,
            outcome,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gomarket_core::{Money, Product};
    use gomarket_db::{DbError, DbResult, MemoryStore};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::state::CartState;

    const KEY: &str = "@GoMarketPlace:cartProducts";

    fn product(id: &str, cents: i64) -> Product {
        Product::new(
            id,
            format!("Product {}", id),
            format!("https://img.example/{}.png", id),
            Money::from_cents(cents),
        )
    }

    /// Store whose writes can be switched to fail and are counted.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
        writes: AtomicUsize,
        write_delay: Option<Duration>,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> DbResult<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(DbError::QueryFailed("disk I/O error".into()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> DbResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.write_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(DbError::QueryFailed("disk full".into()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> DbResult<()> {
            self.inner.remove(key).await
        }
    }

    async fn load_with(stored: &str) -> LoadedCart {
        let store = Arc::new(MemoryStore::with_entry(KEY, stored));
        CartPersistence::new(store, KEY).load().await.unwrap()
    }

    #[tokio::test]
    async fn test_load_absent() {
        let persistence = CartPersistence::new(Arc::new(MemoryStore::new()), KEY);
        let loaded = persistence.load().await.unwrap();

        assert!(loaded.cart.is_empty());
        assert_eq!(loaded.source, LoadSource::Absent);

        assert_eq!(load_with("   ").await.source, LoadSource::Absent);
    }

    #[tokio::test]
    async fn test_load_restores_order_and_quantities() {
        let loaded = load_with(
            r#"[{"id":"2","title":"B","image_url":"b.png","price":5,"quantity":3},
                {"id":"1","title":"A","image_url":"a.png","price":10.5,"quantity":1}]"#,
        )
        .await;

        assert_eq!(loaded.source, LoadSource::Restored);
        let ids: Vec<&str> = loaded.cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(loaded.cart.items()[0].quantity, 3);
        assert_eq!(loaded.cart.items()[1].price, Money::from_cents(1050));
    }

    #[tokio::test]
    async fn test_load_discards_malformed_data() {
        for stored in [
            "not json",
            r#"{"id":"1"}"#,
            r#"[{"id":"1","title":"A","image_url":"a.png","price":10,"quantity":0}]"#,
            r#"[{"id":"1","title":"A","image_url":"a.png","price":10,"quantity":1},
                {"id":"1","title":"A","image_url":"a.png","price":10,"quantity":2}]"#,
            r#"[{"id":"1","title":"A","image_url":"a.png","price":-1,"quantity":1}]"#,
            r#"[{"id":"1","title":"A","image_url":"a.png","price":10.999,"quantity":1}]"#,
        ] {
            let loaded = load_with(stored).await;
            assert!(loaded.cart.is_empty(), "{stored}");
            assert!(
                matches!(loaded.source, LoadSource::Discarded(_)),
                "{stored}"
            );
        }
    }

    #[tokio::test]
    async fn test_load_then_save_keeps_stored_prices() {
        let stored = r#"[{"id":"1","title":"A","image_url":"a.png","price":10.99,"quantity":2}]"#;
        let store = Arc::new(MemoryStore::with_entry(KEY, stored));
        let persistence = CartPersistence::new(store.clone(), KEY);

        let loaded = persistence.load().await.unwrap();
        persistence.save(&loaded.cart).await.unwrap();

        assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some(stored));
    }

    #[tokio::test]
    async fn test_load_propagates_store_failure() {
        let store = Arc::new(FlakyStore::default());
        store.fail_reads.store(true, Ordering::SeqCst);

        let result = CartPersistence::new(store, KEY).load().await;
        assert!(matches!(result, Err(CartError::Storage(_))));
    }

    #[tokio::test]
    async fn test_save_then_clear() {
        let store = Arc::new(MemoryStore::new());
        let persistence = CartPersistence::new(store.clone(), KEY);

        let mut cart = Cart::new();
        cart.add(&product("1", 1000));
        persistence.save(&cart).await.unwrap();

        let raw = store.get(KEY).await.unwrap().unwrap();
        assert_eq!(
            raw,
            r#"[{"id":"1","title":"Product 1","image_url":"https://img.example/1.png","price":10.0,"quantity":1}]"#
        );

        persistence.clear().await.unwrap();
        assert_eq!(store.get(KEY).await.unwrap(), None);
    }

    fn spawn_worker(
        store: Arc<dyn KeyValueStore>,
        state: &CartState,
    ) -> (tokio::task::JoinHandle<()>, PersistenceHandle) {
        let (worker, handle) =
            PersistenceWorker::new(CartPersistence::new(store, KEY), state.subscribe(), true);
        (tokio::spawn(worker.run()), handle)
    }

    #[tokio::test]
    async fn test_worker_persists_each_change() {
        let store = Arc::new(MemoryStore::new());
        let state = CartState::new();
        let (task, handle) = spawn_worker(store.clone(), &state);

        state.add_to_cart(&product("1", 1000));
        assert!(handle.flushed(1).await.unwrap());

        let stored: Cart = serde_json::from_str(&store.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.items()[0].quantity, 1);

        state.increment("1");
        assert!(handle.flushed(2).await.unwrap());

        let stored: Cart = serde_json::from_str(&store.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.items()[0].quantity, 2);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_skips_initial_snapshot_and_no_ops() {
        let store = Arc::new(FlakyStore::default());
        let mut loaded = Cart::new();
        loaded.add(&product("1", 1000));
        let state = CartState::from_loaded(loaded);

        let (task, handle) = spawn_worker(store.clone(), &state);

        state.decrement("1");
        state.add_to_cart(&product("1", 1000));
        state.increment("missing");

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restored_cart_changes_all_reach_storage() {
        let store = Arc::new(MemoryStore::new());
        let persistence = CartPersistence::new(store.clone(), KEY);

        let mut seeded = Cart::new();
        seeded.add(&product("a", 100));
        seeded.add(&product("b", 200));
        persistence.save(&seeded).await.unwrap();

        let loaded = persistence.load().await.unwrap();
        assert_eq!(loaded.source, LoadSource::Restored);
        let state = CartState::from_loaded(loaded.cart);
        let (task, handle) = spawn_worker(store.clone(), &state);

        state.increment("a");
        state.add_to_cart(&product("c", 300));
        assert!(handle.flushed(2).await.unwrap());

        state.decrement("a");
        state.increment("c");

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        let stored: Cart = serde_json::from_str(&store.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.items(), state.products().as_slice());
        assert_eq!(handle.last_report().version, 4);
    }

    #[tokio::test]
    async fn test_latest_snapshot_wins_with_slow_store() {
        let store = Arc::new(FlakyStore {
            write_delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let state = CartState::new();
        let (task, handle) = spawn_worker(store.clone(), &state);

        state.add_to_cart(&product("1", 1000));
        for _ in 0..10 {
            state.increment("1");
        }
        let last = state.version();
        assert_eq!(last, 11);

        assert!(handle.flushed(last).await.unwrap());

        let stored: Cart =
            serde_json::from_str(&store.inner.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.items()[0].quantity, 11);
        assert!(store.writes.load(Ordering::SeqCst) <= 11);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_not_retried() {
        let store = Arc::new(FlakyStore::default());
        store.fail_writes.store(true, Ordering::SeqCst);
        let state = CartState::new();
        let (task, handle) = spawn_worker(store.clone(), &state);

        state.add_to_cart(&product("1", 1000));
        let before = state.products();
        assert!(!handle.flushed(1).await.unwrap());
        assert_eq!(handle.last_report().outcome, WriteOutcome::Failed);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        // In-memory cart is untouched by the failed write
        assert_eq!(state.products(), before);
        assert_eq!(state.version(), 1);
        assert_eq!(state.products()[0].quantity, 1);

        // The next change rewrites the whole cart
        store.fail_writes.store(false, Ordering::SeqCst);
        state.add_to_cart(&product("2", 500));
        assert!(handle.flushed(2).await.unwrap());

        let stored: Cart =
            serde_json::from_str(&store.inner.get(KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 2);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_handles_dropped() {
        let store = Arc::new(MemoryStore::new());
        let state = CartState::new();
        let (task, handle) = spawn_worker(store.clone(), &state);

        let reports = handle.clone();
        drop(handle);
        drop(reports);

        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_flushed_after_stop_reports_worker_stopped() {
        let store = Arc::new(MemoryStore::new());
        let state = CartState::new();
        let (task, handle) = spawn_worker(store, &state);

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert!(handle.flushed(0).await.unwrap());
        assert!(matches!(
            handle.flushed(5).await,
            Err(CartError::WorkerStopped)
        ));
    }
}
