//! Symmetric key parsing
//!
//! Keys are supplied as 64 hexadecimal characters (32 bytes). There is no
//! derivation step: the decoded bytes are the AES-256 key.

use std::fmt;

use crate::store::{StoreError, StoreResult};

/// Length of an AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// A raw 256-bit encryption key
#[derive(Clone)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Parse a key from its hexadecimal form.
    ///
    /// Surrounding whitespace is ignored. Errors report lengths only.
    pub fn from_hex(hex_key: &str) -> StoreResult<Self> {
        // An odd digit count is not a whole number of bytes
        let bytes = hex::decode(hex_key.trim()).map_err(|_| StoreError::InvalidKeyEncoding)?;
        Self::from_bytes(&bytes)
    }

    /// Build a key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| StoreError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(key))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}
