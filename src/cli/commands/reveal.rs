//! Reveal command implementation
//!
//! Decrypts one value produced by `reversible_encrypt` or
//! `format_preserving_encrypt`.

use crate::cli::{EXIT_CONFIG, EXIT_MASKING, EXIT_SUCCESS};
use crate::config::secret_from_env;
use crate::domain::CipherError;
use crate::masking::{EncryptionKey, FieldCipher, TokenEncoding};
use clap::Args;
use secrecy::ExposeSecret;

/// Environment variable read when `--key` is not given
pub const REVEAL_KEY_ENV: &str = "TABMASK_REVEAL_KEY";

/// Arguments for the reveal command
#[derive(Args, Debug)]
pub struct RevealArgs {
    /// Encryption key from the policy (falls back to TABMASK_REVEAL_KEY)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Token encoding: "envelope" for reversible_encrypt,
    /// "wrapped" for format_preserving_encrypt
    #[arg(short, long, default_value = "envelope")]
    pub encoding: String,

    /// Masked value to decrypt
    pub token: String,
}

impl RevealArgs {
    /// Execute the reveal command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let encoding: TokenEncoding = match self.encoding.parse() {
            Ok(e) => e,
            Err(e) => {
                eprintln!("{e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let Some(key) = self.resolve_key() else {
            eprintln!("No key given; pass --key or set {REVEAL_KEY_ENV}");
            return Ok(EXIT_CONFIG);
        };

        match reveal(&key, &self.token, encoding) {
            Ok(plaintext) => {
                println!("{plaintext}");
                Ok(EXIT_SUCCESS)
            }
            Err(e @ CipherError::InvalidKey(_)) => {
                tracing::error!(error = %e, "Reveal failed");
                eprintln!("❌ {e}");
                Ok(EXIT_CONFIG)
            }
            Err(e) => {
                tracing::error!(error = %e, "Reveal failed");
                eprintln!("❌ {e}");
                Ok(EXIT_MASKING)
            }
        }
    }

    fn resolve_key(&self) -> Option<EncryptionKey> {
        match &self.key {
            Some(key) => Some(EncryptionKey::new(key.clone())),
            None => secret_from_env(REVEAL_KEY_ENV).map(|secret| {
                let key = secret.expose_secret().as_str();
                EncryptionKey::new(key)
            }),
        }
    }
}

/// Decrypt `token` with `key`
pub fn reveal(
    key: &EncryptionKey,
    token: &str,
    encoding: TokenEncoding,
) -> Result<String, CipherError> {
    FieldCipher::new(key)?.open(token.trim(), encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_both_encodings() {
        let key = EncryptionKey::generate();
        let cipher = FieldCipher::new(&key).unwrap();

        for encoding in [TokenEncoding::Envelope, TokenEncoding::Wrapped] {
            let token = cipher.seal("123-45-6789", encoding).unwrap();
            assert_eq!(reveal(&key, &token, encoding).unwrap(), "123-45-6789");
        }
    }

    #[test]
    fn test_reveal_with_wrong_key_fails() {
        let cipher = FieldCipher::new(&EncryptionKey::generate()).unwrap();
        let wrong_key = EncryptionKey::generate();

        for encoding in [TokenEncoding::Envelope, TokenEncoding::Wrapped] {
            let token = cipher.seal("secret", encoding).unwrap();
            assert!(matches!(
                reveal(&wrong_key, &token, encoding),
                Err(CipherError::Decryption(_))
            ));
        }
    }

    #[test]
    fn test_reveal_wrapped_token_as_envelope_is_malformed() {
        let key = EncryptionKey::generate();
        let token = FieldCipher::new(&key)
            .unwrap()
            .seal("secret", TokenEncoding::Wrapped)
            .unwrap();

        assert!(reveal(&key, &token, TokenEncoding::Envelope).is_err());
    }

    #[test]
    fn test_explicit_key_wins() {
        let args = RevealArgs {
            key: Some("abc".to_string()),
            encoding: "envelope".to_string(),
            token: String::new(),
        };
        assert_eq!(args.resolve_key().unwrap().expose(), "abc");
    }
}
