//! # State Module
//!
//! In-memory cart state shared between the UI-facing context and the
//! persistence worker.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  CartContext (UI)                    PersistenceWorker                  │
//! │       │ add / increment / decrement        ▲                            │
//! │       ▼                                    │ watch::Receiver            │
//! │  ┌─────────────────────────────────────────┴───────────────────────┐   │
//! │  │  CartState                                                      │   │
//! │  │  watch::Sender<CartSnapshot { version, cart: Arc<Cart>, .. }>   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Mutations run under the channel's write lock, one at a time         │
//! │  • Readers get an Arc<Cart> and never block writers for long           │
//! │  • No-op mutations publish nothing                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

pub use cart::{CartSnapshot, CartState};
