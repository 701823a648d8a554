//! Masking rules
//!
//! A [`MaskingRule`] is one strategy together with the options it needs,
//! carried as typed data. Rules are exchanged as [`RuleDocument`]s:
//!
//! ```json
//! {"type": "partial_mask", "options": {"keep_first": 1, "keep_last": 4}}
//! ```
//!
//! Converting a document into a rule validates every required option, so a
//! rule that exists is always complete.

use crate::domain::RuleError;
use crate::masking::cipher::{EncryptionKey, TokenEncoding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Strategy identifier without options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingStrategy {
    FullMask,
    PartialMask,
    FormatPreservingEncrypt,
    FakeReplace,
    Hash,
    ReversibleEncrypt,
    EmailMask,
    PhoneMask,
    SsnMask,
    DateShift,
    NumberRandomize,
}

impl MaskingStrategy {
    /// Every strategy, in display order
    pub const ALL: [MaskingStrategy; 11] = [
        MaskingStrategy::FullMask,
        MaskingStrategy::PartialMask,
        MaskingStrategy::FormatPreservingEncrypt,
        MaskingStrategy::FakeReplace,
        MaskingStrategy::Hash,
        MaskingStrategy::ReversibleEncrypt,
        MaskingStrategy::EmailMask,
        MaskingStrategy::PhoneMask,
        MaskingStrategy::SsnMask,
        MaskingStrategy::DateShift,
        MaskingStrategy::NumberRandomize,
    ];

    /// Identifier used in rule documents
    pub fn as_str(&self) -> &'static str {
        match self {
            MaskingStrategy::FullMask => "full_mask",
            MaskingStrategy::PartialMask => "partial_mask",
            MaskingStrategy::FormatPreservingEncrypt => "format_preserving_encrypt",
            MaskingStrategy::FakeReplace => "fake_replace",
            MaskingStrategy::Hash => "hash",
            MaskingStrategy::ReversibleEncrypt => "reversible_encrypt",
            MaskingStrategy::EmailMask => "email_mask",
            MaskingStrategy::PhoneMask => "phone_mask",
            MaskingStrategy::SsnMask => "ssn_mask",
            MaskingStrategy::DateShift => "date_shift",
            MaskingStrategy::NumberRandomize => "number_randomize",
        }
    }

    /// Label written by the legacy desktop tool's rule exports
    pub fn legacy_label(&self) -> &'static str {
        match self {
            MaskingStrategy::FullMask => "Full Masking (****)",
            MaskingStrategy::PartialMask => "Partial Masking",
            MaskingStrategy::FormatPreservingEncrypt => "Format-Preserving Encryption",
            MaskingStrategy::FakeReplace => "Fake Data Replacement",
            MaskingStrategy::Hash => "Hash (One-way)",
            MaskingStrategy::ReversibleEncrypt => "Reversible (with key)",
            MaskingStrategy::EmailMask => "Email Masking",
            MaskingStrategy::PhoneMask => "Phone Masking",
            MaskingStrategy::SsnMask => "SSN Masking",
            MaskingStrategy::DateShift => "Date Shifting",
            MaskingStrategy::NumberRandomize => "Number Randomization",
        }
    }

    /// Whether values masked with this strategy are recorded for reversal
    pub fn is_reversible(&self) -> bool {
        matches!(
            self,
            MaskingStrategy::FormatPreservingEncrypt | MaskingStrategy::ReversibleEncrypt
        )
    }
}

impl fmt::Display for MaskingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaskingStrategy {
    type Err = RuleError;

    /// Accepts document identifiers and legacy labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        MaskingStrategy::ALL
            .into_iter()
            .find(|strategy| {
                strategy.as_str().eq_ignore_ascii_case(trimmed)
                    || strategy.legacy_label() == trimmed
            })
            .ok_or_else(|| RuleError::UnknownStrategy(s.to_string()))
    }
}

/// A strategy bound to its typed options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleDocument", into = "RuleDocument")]
pub enum MaskingRule {
    /// Every character becomes `*`
    FullMask,
    /// Keep the first/last characters, mask the middle
    PartialMask { keep_first: usize, keep_last: usize },
    /// Encrypt, then wrap the envelope text in another base64 layer
    FormatPreservingEncrypt { key: EncryptionKey },
    /// Replace with synthetic data chosen by field name
    FakeReplace,
    /// Truncated SHA-256 hex digest
    Hash,
    /// Encrypt and emit the envelope text
    ReversibleEncrypt { key: EncryptionKey },
    EmailMask,
    PhoneMask,
    SsnMask,
    /// Move a date by a fixed number of days
    DateShift { shift_days: i64 },
    /// Add up to ±10% uniform noise
    NumberRandomize,
}

impl MaskingRule {
    /// Strategy of this rule
    pub fn strategy(&self) -> MaskingStrategy {
        match self {
            MaskingRule::FullMask => MaskingStrategy::FullMask,
            MaskingRule::PartialMask { .. } => MaskingStrategy::PartialMask,
            MaskingRule::FormatPreservingEncrypt { .. } => MaskingStrategy::FormatPreservingEncrypt,
            MaskingRule::FakeReplace => MaskingStrategy::FakeReplace,
            MaskingRule::Hash => MaskingStrategy::Hash,
            MaskingRule::ReversibleEncrypt { .. } => MaskingStrategy::ReversibleEncrypt,
            MaskingRule::EmailMask => MaskingStrategy::EmailMask,
            MaskingRule::PhoneMask => MaskingStrategy::PhoneMask,
            MaskingRule::SsnMask => MaskingStrategy::SsnMask,
            MaskingRule::DateShift { .. } => MaskingStrategy::DateShift,
            MaskingRule::NumberRandomize => MaskingStrategy::NumberRandomize,
        }
    }

    /// Key and output encoding for the encrypting strategies
    pub fn encryption(&self) -> Option<(&EncryptionKey, TokenEncoding)> {
        match self {
            MaskingRule::ReversibleEncrypt { key } => Some((key, TokenEncoding::Envelope)),
            MaskingRule::FormatPreservingEncrypt { key } => Some((key, TokenEncoding::Wrapped)),
            _ => None,
        }
    }

    /// Check invariants the type system cannot express
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidOption`] for a blank encryption key.
    pub fn validate(&self) -> Result<(), RuleError> {
        if let Some((key, _)) = self.encryption() {
            if key.is_blank() {
                return Err(RuleError::InvalidOption {
                    strategy: self.strategy().as_str(),
                    option: "key",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Build a validated rule from its document form
    pub fn from_document(document: &RuleDocument) -> Result<Self, RuleError> {
        let strategy: MaskingStrategy = document.strategy.parse()?;
        let options = &document.options;

        let rule = match strategy {
            MaskingStrategy::FullMask => MaskingRule::FullMask,
            MaskingStrategy::PartialMask => MaskingRule::PartialMask {
                keep_first: non_negative(strategy, options, "keep_first")?,
                keep_last: non_negative(strategy, options, "keep_last")?,
            },
            MaskingStrategy::FormatPreservingEncrypt => MaskingRule::FormatPreservingEncrypt {
                key: key_option(strategy, options)?,
            },
            MaskingStrategy::FakeReplace => MaskingRule::FakeReplace,
            MaskingStrategy::Hash => MaskingRule::Hash,
            MaskingStrategy::ReversibleEncrypt => MaskingRule::ReversibleEncrypt {
                key: key_option(strategy, options)?,
            },
            MaskingStrategy::EmailMask => MaskingRule::EmailMask,
            MaskingStrategy::PhoneMask => MaskingRule::PhoneMask,
            MaskingStrategy::SsnMask => MaskingRule::SsnMask,
            MaskingStrategy::DateShift => MaskingRule::DateShift {
                shift_days: integer(strategy, options, "shift_days")?,
            },
            MaskingStrategy::NumberRandomize => MaskingRule::NumberRandomize,
        };

        rule.validate()?;
        Ok(rule)
    }

    /// Document form of this rule
    pub fn to_document(&self) -> RuleDocument {
        let mut options = Map::new();
        match self {
            MaskingRule::PartialMask {
                keep_first,
                keep_last,
            } => {
                options.insert("keep_first".into(), Value::from(*keep_first));
                options.insert("keep_last".into(), Value::from(*keep_last));
            }
            MaskingRule::FormatPreservingEncrypt { key }
            | MaskingRule::ReversibleEncrypt { key } => {
                options.insert("key".into(), Value::from(key.expose()));
            }
            MaskingRule::DateShift { shift_days } => {
                options.insert("shift_days".into(), Value::from(*shift_days));
            }
            _ => {}
        }

        RuleDocument {
            strategy: self.strategy().as_str().to_string(),
            options,
        }
    }
}

impl fmt::Display for MaskingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskingRule::PartialMask {
                keep_first,
                keep_last,
            } => write!(f, "partial_mask(keep_first={keep_first}, keep_last={keep_last})"),
            MaskingRule::DateShift { shift_days } => write!(f, "date_shift({shift_days} days)"),
            other => f.write_str(other.strategy().as_str()),
        }
    }
}

/// Serialized form of a rule: `{"type": ..., "options": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Strategy identifier (or legacy label)
    #[serde(rename = "type")]
    pub strategy: String,

    /// Strategy options
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl RuleDocument {
    /// Create a document with no options
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            options: Map::new(),
        }
    }

    /// Add an option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

impl TryFrom<RuleDocument> for MaskingRule {
    type Error = RuleError;

    fn try_from(document: RuleDocument) -> Result<Self, Self::Error> {
        MaskingRule::from_document(&document)
    }
}

impl From<MaskingRule> for RuleDocument {
    fn from(rule: MaskingRule) -> Self {
        rule.to_document()
    }
}

fn required<'a>(
    strategy: MaskingStrategy,
    options: &'a Map<String, Value>,
    option: &'static str,
) -> Result<&'a Value, RuleError> {
    options.get(option).ok_or(RuleError::MissingOption {
        strategy: strategy.as_str(),
        option,
    })
}

fn integer(
    strategy: MaskingStrategy,
    options: &Map<String, Value>,
    option: &'static str,
) -> Result<i64, RuleError> {
    required(strategy, options, option)?
        .as_i64()
        .ok_or_else(|| RuleError::InvalidOption {
            strategy: strategy.as_str(),
            option,
            reason: "must be an integer".to_string(),
        })
}

fn non_negative(
    strategy: MaskingStrategy,
    options: &Map<String, Value>,
    option: &'static str,
) -> Result<usize, RuleError> {
    let value = integer(strategy, options, option)?;
    usize::try_from(value).map_err(|_| RuleError::InvalidOption {
        strategy: strategy.as_str(),
        option,
        reason: format!("must be non-negative, got {value}"),
    })
}

fn key_option(
    strategy: MaskingStrategy,
    options: &Map<String, Value>,
) -> Result<EncryptionKey, RuleError> {
    let key = required(strategy, options, "key")?
        .as_str()
        .ok_or_else(|| RuleError::InvalidOption {
            strategy: strategy.as_str(),
            option: "key",
            reason: "must be a string".to_string(),
        })?;
    Ok(EncryptionKey::new(key))
}
