//! Domain error types
//!
//! This module defines the error hierarchy for tabmask. Each layer owns a
//! narrow error enum; [`TabmaskError`] wraps them for callers that only need
//! a single type. Third-party error types are converted to strings at the
//! boundary so they never leak through the public API.

use thiserror::Error;

/// Main tabmask error type
///
/// This is the primary error type used by the configuration, adapter and
/// orchestration layers. Commands map it to a process exit code with
/// [`crate::cli::exit_code`].
#[derive(Debug, Error)]
pub enum TabmaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A masking rule failed validation
    #[error("Invalid rule: {0}")]
    Rule(#[from] RuleError),

    /// A policy document could not be read or parsed
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Applying a policy to a table failed
    #[error("Masking error: {0}")]
    Masking(#[from] MaskingError),

    /// Encryption or decryption failed
    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Table source/sink errors
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Rule validation errors
///
/// Raised when a rule is created or added to a policy, never while a policy
/// is being applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The strategy identifier is not recognised
    #[error("unknown masking strategy '{0}'")]
    UnknownStrategy(String),

    /// A required option is absent
    #[error("strategy '{strategy}' requires option '{option}'")]
    MissingOption {
        strategy: &'static str,
        option: &'static str,
    },

    /// An option is present but has the wrong type or value
    #[error("option '{option}' for strategy '{strategy}' is invalid: {reason}")]
    InvalidOption {
        strategy: &'static str,
        option: &'static str,
        reason: String,
    },

    /// Rules must be bound to a non-empty field name
    #[error("field name must not be empty")]
    EmptyField,
}

/// Policy document errors
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The document is not valid JSON or has the wrong shape
    #[error("failed to parse policy document: {0}")]
    Parse(String),

    /// A rule inside the document failed validation
    #[error("rule for field '{field}' is invalid: {source}")]
    InvalidRule {
        field: String,
        #[source]
        source: RuleError,
    },

    /// Reading or writing the document failed
    #[error("policy I/O failed for {path}: {message}")]
    Io { path: String, message: String },
}

/// Encryption envelope errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The key is not 32 bytes of URL-safe base64
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    /// The cipher refused to encrypt
    #[error("encryption failed")]
    Encryption,

    /// Authentication failed: wrong key or tampered token
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The token is not a well-formed envelope
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The envelope carries a version byte this build does not understand
    #[error("unsupported token version {0:#04x}")]
    UnsupportedVersion(u8),
}

/// Errors raised by a value transformer for reasons other than its
/// documented parse fallbacks
#[derive(Debug, Error)]
pub enum TransformError {
    /// Cipher initialization or encryption failed
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Errors that abort a whole `apply()` call
#[derive(Debug, Error)]
pub enum MaskingError {
    /// Transforming a value of `field` failed; no partial table is returned
    #[error("masking failed for field '{field}': {source}")]
    Failure {
        field: String,
        #[source]
        source: TransformError,
    },

    /// A shutdown signal arrived between fields
    #[error("masking cancelled after {fields_done} of {total_fields} fields")]
    Cancelled {
        fields_done: usize,
        total_fields: usize,
    },
}

impl MaskingError {
    /// Field that caused the failure, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            MaskingError::Failure { field, .. } => Some(field),
            MaskingError::Cancelled { .. } => None,
        }
    }
}

/// Table shape errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Columns have different row counts
    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Two columns share a name
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// No column has the requested name
    #[error("no column named '{0}'")]
    MissingColumn(String),
}

/// Table source/sink errors
///
/// These propagate unchanged in meaning; the masking core does not interpret them.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// No adapter handles the file extension
    #[error("unsupported table format for {0}")]
    UnsupportedFormat(String),

    /// Reading or writing the file failed
    #[error("I/O failed for {path}: {message}")]
    Io { path: String, message: String },

    /// Delimited-text parsing or writing failed
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON table parsing or writing failed
    #[error("JSON table error: {0}")]
    Json(String),

    /// Workbook parsing or writing failed
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    /// The loaded rows do not form a valid table
    #[error(transparent)]
    Table(#[from] TableError),
}

// Conversion from std::io::Error
impl From<std::io::Error> for TabmaskError {
    fn from(err: std::io::Error) -> Self {
        TabmaskError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TabmaskError {
    fn from(err: serde_json::Error) -> Self {
        TabmaskError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TabmaskError {
    fn from(err: toml::de::Error) -> Self {
        TabmaskError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for AdapterError {
    fn from(err: csv::Error) -> Self {
        AdapterError::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabmask_error_display() {
        let err = TabmaskError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_rule_error_conversion() {
        let rule_err = RuleError::UnknownStrategy("scramble".to_string());
        let err: TabmaskError = rule_err.into();
        assert!(matches!(err, TabmaskError::Rule(_)));
        assert!(err.to_string().contains("scramble"));
    }

    #[test]
    fn test_missing_option_message() {
        let err = RuleError::MissingOption {
            strategy: "reversible_encrypt",
            option: "key",
        };
        assert_eq!(
            err.to_string(),
            "strategy 'reversible_encrypt' requires option 'key'"
        );
    }

    #[test]
    fn test_masking_failure_keeps_field_and_cause() {
        let err = MaskingError::Failure {
            field: "ssn".to_string(),
            source: TransformError::Cipher(CipherError::InvalidKey("too short".to_string())),
        };
        assert_eq!(err.field(), Some("ssn"));
        assert!(err.to_string().contains("ssn"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TabmaskError = io_err.into();
        assert!(matches!(err, TabmaskError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: TabmaskError = json_err.into();
        assert!(matches!(err, TabmaskError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: TabmaskError = toml_err.into();
        assert!(matches!(err, TabmaskError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &TabmaskError::Io("x".to_string());
        let _: &dyn std::error::Error = &CipherError::Encryption;
        let _: &dyn std::error::Error = &TableError::DuplicateColumn("a".to_string());
    }
}
