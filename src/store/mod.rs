//! Key-value store engine for jsonkv
//!
//! One store owns one JSON document mirrored between memory and a single
//! file on disk.
//!
//! # Components
//!
//! - `path`: validates the store filename once, at open
//! - `file`: reads and replaces the whole file through the codec
//! - `loader`: populates the cache at most once per successful attempt
//! - `pipeline`: one worker draining a FIFO queue of reads and writes
//! - `database`: the public `JsonStore` operations
//!
//! # Guarantees
//!
//! - Operations apply in the order their methods were called; a queued
//!   mutation is applied even if its future is dropped
//! - After a write completes, the file holds exactly that task's document
//! - Callers only ever receive owned copies of stored values
//!
//! # Known limitation
//!
//! With `WriteFailurePolicy::KeepCache` (the default) a failed encode or
//! write leaves the cache ahead of disk. The error is returned to the
//! caller; nothing repairs the divergence. `WriteFailurePolicy::Rollback`
//! restores the previous document instead.

mod config;
mod database;
mod errors;
mod file;
mod loader;
mod outcome;
mod path;
mod pipeline;

pub use config::{StoreConfig, WriteFailurePolicy};
pub use database::JsonStore;
pub use errors::{StoreError, StoreResult};
pub use outcome::Outcome;
pub use path::resolve_store_path;

/// The full key-value mapping persisted by a store
pub type Document = serde_json::Map<String, serde_json::Value>;
