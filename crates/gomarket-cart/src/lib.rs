//! # gomarket-cart: Shopping Cart State for GoMarketplace
//!
//! The cart the storefront UI works against: an observable in-memory cart,
//! a provider scope that hands it to UI code, and a background worker that
//! keeps a copy in on-device storage.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        gomarket-cart                                    │
//! │                                                                         │
//! │  UI code                                                               │
//! │    │  use_cart()? ──► CartContext                                       │
//! │    │                    products / add_to_cart / increment / decrement │
//! │    ▼                                                                    │
//! │  ┌──────────────┐   watch    ┌───────────────────┐   KeyValueStore     │
//! │  │  CartState   │ ─────────► │ PersistenceWorker │ ──────────────────► │
//! │  │  (state/)    │ snapshots  │  (persistence.rs) │  "@GoMarketPlace:   │
//! │  └──────────────┘            └───────────────────┘   cartProducts"     │
//! │         ▲                                                               │
//! │         └── CartProvider::mount loads the stored cart once             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use gomarket_cart::{use_cart, CartConfig, CartProvider};
//!
//! gomarket_cart::init_tracing();
//!
//! let config = CartConfig::load_or_default(None);
//! let provider = CartProvider::open(&config).await?;
//!
//! provider.scope(async {
//!     let cart = use_cart()?;
//!     cart.add_to_cart(&product);
//!     cart.increment(&product.id);
//!     Ok::<_, CartError>(())
//! }).await?;
//!
//! provider.unmount().await?;
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod provider;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, PersistenceSettings, StorageSettings};
pub use error::{ApiError, CartError, CartResult, ErrorCode};
pub use persistence::{
    CartPersistence, LoadSource, LoadedCart, PersistenceHandle, PersistenceWorker, WriteOutcome,
    WriteReport,
};
pub use provider::{use_cart, CartContext, CartProvider};
pub use state::{CartSnapshot, CartState};

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,gomarket=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gomarket_cart=trace` - Trace the cart crate only
/// - Default: INFO, DEBUG for gomarket crates
///
/// Only the first call installs a subscriber; later calls do nothing.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
