//! # Store Errors
//!
//! Error types for the key-value store and its codec.
//!
//! Error codes follow the `JSONKV_<NAME>` format. No error message ever
//! carries key material or document content.

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // ==================
    // Construction Errors
    // ==================
    /// Resolved store path leaves the configured root
    #[error("Path escapes the store root: {0}")]
    PathTraversal(String),

    /// Filename is empty, names a directory, or contains a NUL byte
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Encryption key does not decode to 32 bytes
    #[error("Invalid encryption key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Encryption key is not a hexadecimal string
    #[error("Invalid encryption key: not a hexadecimal string")]
    InvalidKeyEncoding,

    // ==================
    // Codec Errors
    // ==================
    /// Encrypted envelope has the wrong shape
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Authentication failed (tampered content or wrong key)
    #[error("Decryption failed: authentication check did not pass")]
    DecryptionFailed,

    /// Encryption failed
    #[error("Encryption failed")]
    EncryptionFailed,

    // ==================
    // Data Errors
    // ==================
    /// Stored content is not a valid JSON document
    #[error("Corrupted data: {0}")]
    CorruptedJson(String),

    /// Value could not be converted to or from JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Key is absent from the document
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    // ==================
    // I/O Errors
    // ==================
    /// Read or write on the store file failed
    #[error("I/O failure: {context}: {message}")]
    IoFailure {
        context: String,
        kind: io::ErrorKind,
        message: String,
    },

    // ==================
    // Runtime Errors
    // ==================
    /// The store worker could not take or finish the operation
    #[error("Store worker unavailable: {0}")]
    WorkerUnavailable(String),
}

impl StoreError {
    /// Wrap an I/O error with the operation that produced it
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::IoFailure {
            context: context.into(),
            kind: source.kind(),
            message: source.to_string(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::PathTraversal(_) => "JSONKV_PATH_TRAVERSAL",
            StoreError::InvalidFilename(_) => "JSONKV_INVALID_FILENAME",
            StoreError::InvalidKeyLength { .. } => "JSONKV_INVALID_KEY_LENGTH",
            StoreError::InvalidKeyEncoding => "JSONKV_INVALID_KEY_ENCODING",
            StoreError::MalformedEnvelope(_) => "JSONKV_MALFORMED_ENVELOPE",
            StoreError::DecryptionFailed => "JSONKV_DECRYPTION_FAILED",
            StoreError::EncryptionFailed => "JSONKV_ENCRYPTION_FAILED",
            StoreError::CorruptedJson(_) => "JSONKV_CORRUPTED_JSON",
            StoreError::Serialization(_) => "JSONKV_SERIALIZATION",
            StoreError::KeyNotFound(_) => "JSONKV_KEY_NOT_FOUND",
            StoreError::IoFailure { .. } => "JSONKV_IO_FAILURE",
            StoreError::WorkerUnavailable(_) => "JSONKV_WORKER_UNAVAILABLE",
        }
    }

    /// Returns whether this is the domain-level missing-key outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound(_))
    }

    /// Returns whether this error can only be raised while constructing a store
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::PathTraversal(_)
                | StoreError::InvalidFilename(_)
                | StoreError::InvalidKeyLength { .. }
                | StoreError::InvalidKeyEncoding
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::DecryptionFailed.code(), "JSONKV_DECRYPTION_FAILED");
        assert_eq!(
            StoreError::PathTraversal("../x".into()).code(),
            "JSONKV_PATH_TRAVERSAL"
        );
        assert_eq!(
            StoreError::KeyNotFound("a".into()).code(),
            "JSONKV_KEY_NOT_FOUND"
        );
        assert_eq!(
            StoreError::WorkerUnavailable("stopped".into()).code(),
            "JSONKV_WORKER_UNAVAILABLE"
        );
    }

    #[test]
    fn test_io_error_keeps_kind() {
        let err = StoreError::io(
            "read store file",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        match err {
            StoreError::IoFailure { kind, ref context, .. } => {
                assert_eq!(kind, io::ErrorKind::PermissionDenied);
                assert_eq!(context, "read store file");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classification() {
        assert!(StoreError::KeyNotFound("k".into()).is_not_found());
        assert!(!StoreError::DecryptionFailed.is_not_found());
        assert!(StoreError::InvalidKeyEncoding.is_configuration());
        assert!(!StoreError::CorruptedJson("x".into()).is_configuration());
    }

    #[test]
    fn test_key_length_message_has_no_key_bytes() {
        let err = StoreError::InvalidKeyLength {
            expected: 32,
            actual: 16,
        };
        assert_eq!(
            err.to_string(),
            "Invalid encryption key length: expected 32 bytes, got 16"
        );
    }
}
