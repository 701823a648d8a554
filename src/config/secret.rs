//! Zeroizing storage for key material
//!
//! Encryption keys travel through rule documents, the command line and the
//! environment. Once read they are held in a [`SecretString`], which wipes
//! its buffer on drop and prints as `[REDACTED ...]` under `Debug`.
//!
//! ```rust
//! use secrecy::ExposeSecret;
//! use tabmask::config::secret_string;
//!
//! let key = secret_string("c2VjcmV0LWtleS1tYXRlcmlhbA==".to_string());
//! assert_eq!(key.expose_secret().as_str(), "c2VjcmV0LWtleS1tYXRlcmlhbA==");
//! assert!(!format!("{key:?}").contains("c2Vj"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Key text that is wiped when dropped
#[derive(Clone, Debug, Zeroize, Serialize, Deserialize)]
#[serde(transparent)]
#[zeroize(drop)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CloneableSecret for KeyMaterial {}
impl DebugSecret for KeyMaterial {}
impl SerializableSecret for KeyMaterial {}

impl From<String> for KeyMaterial {
    fn from(s: String) -> Self {
        KeyMaterial(s)
    }
}

impl PartialEq<str> for KeyMaterial {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Redacted, zeroized string; read it through `expose_secret()`
pub type SecretString = Secret<KeyMaterial>;

/// Wrap a string as a [`SecretString`]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(KeyMaterial(value))
}

/// Read a secret from an environment variable; unset or blank gives `None`
pub fn secret_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(secret_string)
}
