//! Store configuration
//!
//! The containment root is always explicit. `StoreConfig::in_current_dir`
//! reads the process working directory once, at construction, and never again.

use std::path::PathBuf;

use super::errors::{StoreError, StoreResult};

/// What the write pipeline does with the cache when encoding or writing fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFailurePolicy {
    /// The cache keeps the new document; it is ahead of disk until the next
    /// successful write.
    #[default]
    KeepCache,
    /// The cache is restored to the document as it stood before the task.
    Rollback,
}

/// Configuration for opening a [`JsonStore`](super::JsonStore).
#[derive(Clone)]
pub struct StoreConfig {
    /// Directory the store file must resolve inside of.
    pub root: PathBuf,
    /// Store filename, relative to `root`.
    pub filename: String,
    /// Optional 64-character hexadecimal AES-256 key.
    pub encryption_key: Option<String>,
    /// Cache behavior on a failed write.
    pub write_failure: WriteFailurePolicy,
    /// Write through a temporary file, fsync, then rename over the target.
    pub durable: bool,
}

impl StoreConfig {
    /// Create config for `filename` under `root`.
    pub fn new(root: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            filename: filename.into(),
            encryption_key: None,
            write_failure: WriteFailurePolicy::default(),
            durable: true,
        }
    }

    /// Create config rooted at the current working directory.
    pub fn in_current_dir(filename: impl Into<String>) -> StoreResult<Self> {
        let root = std::env::current_dir()
            .map_err(|e| StoreError::io("resolve current directory", e))?;
        Ok(Self::new(root, filename))
    }

    /// Enable encryption at rest with a hex-encoded key.
    pub fn with_encryption_key(mut self, hex_key: impl Into<String>) -> Self {
        self.encryption_key = Some(hex_key.into());
        self
    }

    /// Set the write failure policy.
    pub fn with_write_failure(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure = policy;
        self
    }

    /// Enable or disable temp-file-and-rename writes.
    pub fn with_durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    /// Check if encryption is configured.
    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.is_some()
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("root", &self.root)
            .field("filename", &self.filename)
            .field("encrypted", &self.is_encrypted())
            .field("write_failure", &self.write_failure)
            .field("durable", &self.durable)
            .finish()
    }
}
