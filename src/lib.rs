//! jsonkv - a single-file JSON key-value store
//!
//! One JSON document per file, cached in memory, written through on every
//! mutation, optionally sealed with AES-256-GCM at rest.
//!
//! ```ignore
//! use jsonkv::{JsonStore, StoreConfig};
//!
//! let store = JsonStore::open(StoreConfig::in_current_dir("app.json")?)?;
//! store.set("greeting", "hello").await?;
//! assert!(store.get("greeting").await?.is_found());
//! ```

pub mod cli;
pub mod codec;
pub mod observability;
pub mod store;

pub use codec::{Codec, EncryptionKey};
pub use store::{
    Document, JsonStore, Outcome, StoreConfig, StoreError, StoreResult, WriteFailurePolicy,
};
