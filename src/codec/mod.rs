//! Document codec for jsonkv
//!
//! Turns the serialized document into the on-disk blob and back.
//!
//! # Modes
//!
//! - Plain: both directions are the identity
//! - Encrypted: AES-256-GCM under a caller-supplied 32-byte key, with a
//!   fresh random 12-byte nonce drawn for every `encode`
//!
//! A keyed codec never accepts content it did not produce: plain JSON fails
//! the envelope shape check, and anything else fails authentication.

mod envelope;
mod key;

pub use envelope::{Envelope, NONCE_LEN, TAG_LEN};
pub use key::{EncryptionKey, KEY_LEN};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::store::{StoreError, StoreResult};

/// Stateless document codec
#[derive(Clone)]
pub struct Codec {
    cipher: Option<Aes256Gcm>,
}

impl Codec {
    /// A codec that passes content through unchanged
    pub fn plain() -> Self {
        Self { cipher: None }
    }

    /// An encrypting codec for the given key
    pub fn encrypted(key: &EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self {
            cipher: Some(cipher),
        }
    }

    /// An encrypting codec from a 64-character hex key
    pub fn from_hex_key(hex_key: &str) -> StoreResult<Self> {
        Ok(Self::encrypted(&EncryptionKey::from_hex(hex_key)?))
    }

    /// A plain codec when `hex_key` is `None`, otherwise an encrypting one
    pub fn from_optional_key(hex_key: Option<&str>) -> StoreResult<Self> {
        match hex_key {
            Some(k) => Self::from_hex_key(k),
            None => Ok(Self::plain()),
        }
    }

    /// Returns whether content is encrypted at rest
    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    /// Encode plaintext into a disk blob
    pub fn encode(&self, plain_text: &str) -> StoreResult<String> {
        let Some(cipher) = &self.cipher else {
            return Ok(plain_text.to_string());
        };

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        // aes-gcm appends the tag to the ciphertext
        let mut sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plain_text.as_bytes())
            .map_err(|_| StoreError::EncryptionFailed)?;
        let split = sealed.len() - TAG_LEN;
        let tag: [u8; TAG_LEN] = sealed[split..]
            .try_into()
            .map_err(|_| StoreError::EncryptionFailed)?;
        sealed.truncate(split);

        Ok(Envelope {
            nonce,
            tag,
            ciphertext: sealed,
        }
        .to_string())
    }

    /// Decode a disk blob back into plaintext
    pub fn decode(&self, blob: &str) -> StoreResult<String> {
        let Some(cipher) = &self.cipher else {
            return Ok(blob.to_string());
        };

        let envelope = Envelope::parse(blob)?;
        let mut sealed = envelope.ciphertext;
        sealed.extend_from_slice(&envelope.tag);

        let plain = cipher
            .decrypt(Nonce::from_slice(&envelope.nonce), sealed.as_slice())
            .map_err(|_| StoreError::DecryptionFailed)?;

        String::from_utf8(plain).map_err(|_| StoreError::DecryptionFailed)
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("encrypted", &self.is_encrypted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const KEY_B: &str = "1f1e1d1c1b1a191817161514131211100f0e0d0c0b0a09080706050403020100";

    #[test]
    fn test_plain_is_identity() {
        let codec = Codec::plain();
        let doc = "{\n  \"a\": 1\n}";
        assert_eq!(codec.encode(doc).unwrap(), doc);
        assert_eq!(codec.decode(doc).unwrap(), doc);
        assert!(!codec.is_encrypted());
    }

    #[test]
    fn test_round_trip_with_key() {
        let codec = Codec::from_hex_key(KEY_A).unwrap();
        let doc = r#"{"s":"secret","n":[1,2,3]}"#;
        let blob = codec.encode(doc).unwrap();

        assert!(!blob.contains("secret"));
        assert!(!blob.starts_with('{'));
        assert_eq!(codec.decode(&blob).unwrap(), doc);
    }

    #[test]
    fn test_fresh_nonce_per_encode() {
        let codec = Codec::from_hex_key(KEY_A).unwrap();
        let first = codec.encode("{}").unwrap();
        let second = codec.encode("{}").unwrap();
        assert_ne!(first, second);

        let nonce_a = Envelope::parse(&first).unwrap().nonce;
        let nonce_b = Envelope::parse(&second).unwrap().nonce;
        assert_ne!(nonce_a, nonce_b);
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let blob = Codec::from_hex_key(KEY_A).unwrap().encode("{}").unwrap();
        let err = Codec::from_hex_key(KEY_B).unwrap().decode(&blob).unwrap_err();
        assert_eq!(err, StoreError::DecryptionFailed);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let codec = Codec::from_hex_key(KEY_A).unwrap();
        let mut envelope = Envelope::parse(&codec.encode(r#"{"a":1}"#).unwrap()).unwrap();
        envelope.ciphertext[0] ^= 0x01;
        let err = codec.decode(&envelope.to_string()).unwrap_err();
        assert_eq!(err, StoreError::DecryptionFailed);
    }

    #[test]
    fn test_plain_json_rejected_with_key() {
        let codec = Codec::from_hex_key(KEY_A).unwrap();
        let err = codec.decode("{\n  \"a\": 1\n}").unwrap_err();
        assert!(matches!(err, StoreError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_garbage_rejected_with_key() {
        use base64::Engine;

        let codec = Codec::from_hex_key(KEY_A).unwrap();
        let garbage = format!(
            "{}:{}:{}",
            base64::engine::general_purpose::STANDARD.encode([1u8; NONCE_LEN]),
            base64::engine::general_purpose::STANDARD.encode([2u8; TAG_LEN]),
            base64::engine::general_purpose::STANDARD.encode(b"not really ciphertext"),
        );
        assert_eq!(codec.decode(&garbage).unwrap_err(), StoreError::DecryptionFailed);
    }

    #[test]
    fn test_invalid_key_length() {
        let err = Codec::from_hex_key("00ff").unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidKeyLength {
                expected: 32,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_debug_hides_cipher_state() {
        let codec = Codec::from_hex_key(KEY_A).unwrap();
        assert_eq!(format!("{:?}", codec), "Codec { encrypted: true }");
    }
}
