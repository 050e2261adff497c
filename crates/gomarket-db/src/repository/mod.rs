//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  KeyValueStore for Database                                            │
//! │       │                                                                 │
//! │       │  db.kv().set(key, value)                                        │
//! │       ▼                                                                 │
//! │  KvRepository                                                          │
//! │  ├── get(&self, key)                                                   │
//! │  ├── set(&self, key, value)                                            │
//! │  ├── remove(&self, key)                                                │
//! │  └── updated_at(&self, key)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite kv_store table                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod kv;
