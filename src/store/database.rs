//! Key-value façade
//!
//! `JsonStore` is the public surface. Every operation is queued on the
//! store's pipeline at call time; reads return owned copies. Nothing in
//! this module touches the store file directly.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};
use super::file::StoreFile;
use super::outcome::Outcome;
use super::path::resolve_store_path;
use super::pipeline::{Mutation, WritePipeline};
use super::Document;
use crate::codec::Codec;
use crate::observability::{log_event_with_fields, Event, MetricsSnapshot};

/// A single-file JSON key-value store
///
/// Cheap to clone; clones share one cache and one write pipeline. Open at
/// most one store per file per process.
#[derive(Debug, Clone)]
pub struct JsonStore {
    pipeline: Arc<WritePipeline>,
}

impl JsonStore {
    /// Validate the configuration and create a store.
    ///
    /// No file is touched until the first operation.
    ///
    /// # Errors
    ///
    /// `PathTraversal`, `InvalidFilename`, `InvalidKeyLength` or
    /// `InvalidKeyEncoding`. No store is created on error.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let root = if config.root.is_absolute() {
            config.root.clone()
        } else {
            std::env::current_dir()
                .map_err(|e| StoreError::io("resolve current directory", e))?
                .join(&config.root)
        };
        let path = resolve_store_path(&root, &config.filename)?;
        let codec = Codec::from_optional_key(config.encryption_key.as_deref())?;

        let encrypted = if codec.is_encrypted() { "true" } else { "false" };
        log_event_with_fields(
            Event::StoreOpened,
            &[("path", &*path.display().to_string()), ("encrypted", encrypted)],
        );

        let file = StoreFile::new(path, codec, config.durable);
        Ok(Self {
            pipeline: Arc::new(WritePipeline::new(file, config.write_failure)),
        })
    }

    /// Absolute path of the store file
    pub fn path(&self) -> &Path {
        self.pipeline.path()
    }

    /// Returns whether the file is encrypted at rest
    pub fn is_encrypted(&self) -> bool {
        self.pipeline.is_encrypted()
    }

    /// Returns whether the cache has been loaded from disk
    pub fn is_loaded(&self) -> bool {
        self.pipeline.is_loaded()
    }

    /// Counters for this store
    pub fn metrics(&self) -> MetricsSnapshot {
        self.pipeline.metrics()
    }

    /// Get a copy of the value at `key`.
    ///
    /// Like every operation below, the read is queued when this method is
    /// called; the returned future only waits for its result.
    pub fn get(&self, key: &str) -> impl Future<Output = StoreResult<Outcome<Value>>> + Send {
        let key = key.to_string();
        let queued = self.pipeline.read(move |doc| match doc.get(&key) {
            Some(value) => Outcome::Found(value.clone()),
            None => Outcome::missing(key),
        });
        async move { queued?.await }
    }

    /// Get the value at `key`, deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> impl Future<Output = StoreResult<Outcome<T>>> + Send {
        let pending = self.get(key);
        async move {
            match pending.await? {
                Outcome::Found(value) => Ok(Outcome::Found(serde_json::from_value(value)?)),
                Outcome::Missing { key } => Ok(Outcome::Missing { key }),
            }
        }
    }

    /// Returns whether `key` is present
    pub fn contains(&self, key: &str) -> impl Future<Output = StoreResult<bool>> + Send {
        let key = key.to_string();
        let queued = self.pipeline.read(move |doc| doc.contains_key(&key));
        async move { queued?.await }
    }

    /// Assign `value` at `key`. Resolves once the document is persisted.
    ///
    /// The write is applied even if the returned future is dropped.
    pub fn set<V: Serialize>(
        &self,
        key: impl Into<String>,
        value: V,
    ) -> impl Future<Output = StoreResult<()>> + Send {
        let key = key.into();
        let queued = serde_json::to_value(value)
            .map_err(StoreError::from)
            .and_then(|value| {
                self.pipeline.enqueue(move |doc| {
                    let mut next = doc.clone();
                    next.insert(key, value);
                    Mutation::Commit { next, output: () }
                })
            });
        async move { queued?.await }
    }

    /// Remove `key`. A missing key is reported without writing to disk.
    pub fn delete(&self, key: &str) -> impl Future<Output = StoreResult<Outcome<()>>> + Send {
        let key = key.to_string();
        let queued = self.pipeline.enqueue(move |doc| {
            if !doc.contains_key(&key) {
                return Mutation::Unchanged(Outcome::missing(key));
            }
            let mut next = doc.clone();
            next.remove(&key);
            Mutation::Commit {
                next,
                output: Outcome::Found(()),
            }
        });
        async move { queued?.await }
    }

    /// All keys, in document order
    pub fn list(&self) -> impl Future<Output = StoreResult<Vec<String>>> + Send {
        let queued = self.pipeline.read(|doc| doc.keys().cloned().collect());
        async move { queued?.await }
    }

    /// Number of keys
    pub fn size(&self) -> impl Future<Output = StoreResult<usize>> + Send {
        let queued = self.pipeline.read(|doc| doc.len());
        async move { queued?.await }
    }

    /// Replace the document with the empty mapping. Always writes.
    pub fn empty(&self) -> impl Future<Output = StoreResult<()>> + Send {
        let queued = self.pipeline.enqueue(|doc| {
            let removed = doc.len();
            Mutation::Commit {
                next: Document::new(),
                output: removed,
            }
        });
        async move {
            let removed = queued?.await?.to_string();
            log_event_with_fields(Event::StoreEmptied, &[("removed", removed.as_str())]);
            Ok::<(), StoreError>(())
        }
    }

    /// A copy of the whole document
    pub fn get_all(&self) -> impl Future<Output = StoreResult<Document>> + Send {
        let queued = self.pipeline.read(|doc| doc.clone());
        async move { queued?.await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn open(temp: &TempDir) -> JsonStore {
        JsonStore::open(StoreConfig::new(temp.path(), "db.json")).unwrap()
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        store.set("a", 1).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Outcome::Found(json!(1)));
        assert_eq!(
            store.get("b").await.unwrap(),
            Outcome::Missing { key: "b".into() }
        );
    }

    #[tokio::test]
    async fn test_delete_and_counts() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        store.set("a", 1).await.unwrap();
        store.set("b", 2).await.unwrap();
        assert!(store.delete("a").await.unwrap().is_found());

        assert_eq!(store.size().await.unwrap(), 1);
        assert_eq!(store.list().await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_does_not_write() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        let outcome = store.delete("ghost").await.unwrap();
        assert_eq!(outcome, Outcome::Missing { key: "ghost".into() });
        assert!(!store.path().exists());
        assert!(store.is_loaded());
    }

    #[tokio::test]
    async fn test_empty_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        store.set("a", 1).await.unwrap();
        store.empty().await.unwrap();
        assert_eq!(store.size().await.unwrap(), 0);
        store.empty().await.unwrap();
        assert_eq!(store.size().await.unwrap(), 0);
        assert_eq!(store.metrics().writes_committed, 3);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_returned_values_are_copies() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        store.set("obj", json!({"n": 1})).await.unwrap();
        let mut value = store.get("obj").await.unwrap().into_value().unwrap();
        value["n"] = json!(99);
        let mut all = store.get_all().await.unwrap();
        all.clear();

        assert_eq!(store.get("obj").await.unwrap(), Outcome::Found(json!({"n": 1})));
        assert_eq!(store.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_typed_access() {
        #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
        struct Profile {
            name: String,
            age: u32,
        }

        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        let profile = Profile {
            name: "ada".into(),
            age: 36,
        };

        store.set("profile", &profile).await.unwrap();
        let loaded: Outcome<Profile> = store.get_as("profile").await.unwrap();
        assert_eq!(loaded, Outcome::Found(profile));

        let err = store.get_as::<u32>("profile").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);
        let other = store.clone();

        store.set("k", "v").await.unwrap();
        assert!(other.contains("k").await.unwrap());
        assert_eq!(other.metrics().load_attempts, 1);
    }

    #[tokio::test]
    async fn test_dropped_set_still_applies() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        drop(store.set("a", 1));
        assert_eq!(store.get("a").await.unwrap(), Outcome::Found(json!(1)));
    }

    #[tokio::test]
    async fn test_call_order_beats_poll_order() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp);

        let first = store.set("k", 1);
        let second = store.set("k", 2);
        let (b, a) = tokio::join!(second, first);
        a.unwrap();
        b.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Outcome::Found(json!(2)));
    }

    #[test]
    fn test_open_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let err = JsonStore::open(StoreConfig::new(temp.path(), "../secret.json")).unwrap_err();
        assert!(matches!(err, StoreError::PathTraversal(_)));
    }

    #[test]
    fn test_open_rejects_bad_key() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::new(temp.path(), "db.json").with_encryption_key("abcd");
        let err = JsonStore::open(config).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKeyLength { .. }));
    }
}
