//! Authenticated encryption for reversible masking
//!
//! Values are sealed with AES-256-GCM under a 32-byte key supplied as
//! URL-safe base64 (the same 44-character shape as a Fernet key). The sealed
//! envelope is
//!
//! ```text
//! version (1 byte, 0x01) | nonce (12 bytes) | ciphertext + tag
//! ```
//!
//! and its canonical text encoding is URL-safe base64 with padding. Every call
//! to [`FieldCipher::seal`] draws a fresh nonce, so equal plaintexts produce
//! different tokens.

use crate::config::secret::{secret_string, SecretString};
use crate::domain::CipherError;
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const TOKEN_VERSION: u8 = 0x01;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Text encoding applied to a sealed envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEncoding {
    /// The envelope's own URL-safe base64 text
    Envelope,
    /// URL-safe base64 of the envelope text (one extra layer)
    Wrapped,
}

impl std::str::FromStr for TokenEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "envelope" => Ok(TokenEncoding::Envelope),
            "wrapped" => Ok(TokenEncoding::Wrapped),
            other => Err(format!(
                "unknown token encoding '{other}', expected 'envelope' or 'wrapped'"
            )),
        }
    }
}

/// Encryption key as written in a rule's `key` option
///
/// The key text is held in a zeroizing secret and never appears in `Debug`
/// output. Its format is only checked when a cipher is built from it.
#[derive(Clone)]
pub struct EncryptionKey(SecretString);

impl EncryptionKey {
    /// Wrap key text
    pub fn new(key: impl Into<String>) -> Self {
        Self(secret_string(key.into()))
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        Self::new(generate_key())
    }

    /// Key text; only call when the key must leave the process (documents, cipher setup)
    pub fn expose(&self) -> &str {
        self.0.expose_secret().as_str()
    }

    /// Check whether the key text is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for EncryptionKey {}

impl Serialize for EncryptionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for EncryptionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(EncryptionKey::new)
    }
}

/// Generate a new random key in URL-safe base64
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

/// Cipher bound to one key
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Build a cipher from key text
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKey`] if the key is not URL-safe base64
    /// decoding to exactly 32 bytes.
    pub fn new(key: &EncryptionKey) -> Result<Self, CipherError> {
        let bytes = URL_SAFE
            .decode(key.expose().trim())
            .map_err(|e| CipherError::InvalidKey(format!("not URL-safe base64: {e}")))?;

        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKey(format!(
                "key must decode to {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&bytes)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` and encode the envelope
    pub fn seal(&self, plaintext: &str, encoding: TokenEncoding) -> Result<String, CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CipherError::Encryption)?;

        let mut envelope = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
        envelope.push(TOKEN_VERSION);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        let text = URL_SAFE.encode(envelope);
        Ok(match encoding {
            TokenEncoding::Envelope => text,
            TokenEncoding::Wrapped => URL_SAFE.encode(text.as_bytes()),
        })
    }

    /// Decode and decrypt a token produced by [`seal`](Self::seal)
    ///
    /// # Errors
    ///
    /// Fails with [`CipherError::Decryption`] under the wrong key or for a
    /// tampered token; never returns garbage plaintext.
    pub fn open(&self, token: &str, encoding: TokenEncoding) -> Result<String, CipherError> {
        let text = match encoding {
            TokenEncoding::Envelope => token.trim().to_string(),
            TokenEncoding::Wrapped => {
                let inner = URL_SAFE
                    .decode(token.trim())
                    .map_err(|e| CipherError::MalformedToken(format!("outer layer: {e}")))?;
                String::from_utf8(inner)
                    .map_err(|_| CipherError::MalformedToken("outer layer is not text".into()))?
            }
        };

        let envelope = URL_SAFE
            .decode(text.as_bytes())
            .map_err(|e| CipherError::MalformedToken(e.to_string()))?;

        let (&version, rest) = envelope
            .split_first()
            .ok_or_else(|| CipherError::MalformedToken("empty envelope".into()))?;
        if version != TOKEN_VERSION {
            return Err(CipherError::UnsupportedVersion(version));
        }
        if rest.len() < NONCE_LEN {
            return Err(CipherError::MalformedToken("envelope too short".into()));
        }

        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Decryption("authentication failed".into()))?;

        String::from_utf8(plaintext)
            .map_err(|_| CipherError::Decryption("plaintext is not UTF-8".into()))
    }
}
