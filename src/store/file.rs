//! Store file I/O
//!
//! The disk boundary of the engine: reads the whole file and decodes it into
//! a [`Document`], or encodes a [`Document`] and replaces the whole file.
//! No caching and no locking happens here.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::errors::{StoreError, StoreResult};
use super::Document;
use crate::codec::Codec;

/// The single file backing a store
#[derive(Debug)]
pub(crate) struct StoreFile {
    path: PathBuf,
    codec: Codec,
    durable: bool,
}

impl StoreFile {
    pub(crate) fn new(path: PathBuf, codec: Codec, durable: bool) -> Self {
        Self {
            path,
            codec,
            durable,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_encrypted(&self) -> bool {
        self.codec.is_encrypted()
    }

    /// Read and decode the document.
    ///
    /// A missing or blank file is the empty document.
    pub(crate) async fn read_document(&self) -> StoreResult<Document> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StoreError::CorruptedJson(
                    "store file is not valid UTF-8".to_string(),
                ))
            }
            Err(e) => return Err(StoreError::io("read store file", e)),
        };

        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        let text = self.codec.decode(&raw)?;
        parse_document(&text)
    }

    /// Encode the document and replace the file contents.
    pub(crate) async fn write_document(&self, document: &Document) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(document)?;
        let blob = self.codec.encode(&text)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io("create store directory", e))?;
        }

        if self.durable {
            self.replace_via_temp(blob.as_bytes()).await
        } else {
            fs::write(&self.path, blob.as_bytes())
                .await
                .map_err(|e| StoreError::io("write store file", e))
        }
    }

    /// Write to a sibling temp file, fsync, then rename over the target.
    ///
    /// On Unix the parent directory is fsynced after the rename so the new
    /// directory entry is durable too.
    async fn replace_via_temp(&self, bytes: &[u8]) -> StoreResult<()> {
        let temp_path = self.temp_path();

        let written: io::Result<()> = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StoreError::io("write store file", e));
        }
        self.sync_parent().await
    }

    #[cfg(unix)]
    async fn sync_parent(&self) -> StoreResult<()> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        let synced: io::Result<()> = async {
            let dir = fs::File::open(parent).await?;
            dir.sync_all().await
        }
        .await;
        synced.map_err(|e| StoreError::io("sync store directory", e))
    }

    #[cfg(not(unix))]
    async fn sync_parent(&self) -> StoreResult<()> {
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

/// Parse decoded text into a document; the top level must be an object.
pub(crate) fn parse_document(text: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::CorruptedJson(
            "top-level value is not an object".to_string(),
        )),
        Err(e) => Err(StoreError::CorruptedJson(e.to_string())),
    }
}
