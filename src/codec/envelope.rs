//! Encrypted envelope format
//!
//! On-disk form: `nonceBase64:tagBase64:ciphertextBase64`, standard base64
//! with padding. The nonce is 12 bytes and the tag 16 bytes.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::store::{StoreError, StoreResult};

/// AES-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

const SEPARATOR: char = ':';

/// The three parts of an encrypted disk record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parse an envelope, validating field count and fixed lengths.
    pub fn parse(blob: &str) -> StoreResult<Self> {
        let fields: Vec<&str> = blob.trim().split(SEPARATOR).collect();
        if fields.len() != 3 {
            return Err(StoreError::MalformedEnvelope(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        }

        let nonce = decode_field("nonce", fields[0])?;
        let nonce: [u8; NONCE_LEN] = nonce.as_slice().try_into().map_err(|_| {
            StoreError::MalformedEnvelope(format!(
                "nonce must be {} bytes, found {}",
                NONCE_LEN,
                nonce.len()
            ))
        })?;

        let tag = decode_field("tag", fields[1])?;
        let tag: [u8; TAG_LEN] = tag.as_slice().try_into().map_err(|_| {
            StoreError::MalformedEnvelope(format!(
                "tag must be {} bytes, found {}",
                TAG_LEN,
                tag.len()
            ))
        })?;

        let ciphertext = decode_field("ciphertext", fields[2])?;

        Ok(Self {
            nonce,
            tag,
            ciphertext,
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            STANDARD.encode(self.nonce),
            STANDARD.encode(self.tag),
            STANDARD.encode(&self.ciphertext),
            sep = SEPARATOR
        )
    }
}

fn decode_field(name: &str, field: &str) -> StoreResult<Vec<u8>> {
    STANDARD
        .decode(field)
        .map_err(|_| StoreError::MalformedEnvelope(format!("{} is not valid base64", name)))
}
