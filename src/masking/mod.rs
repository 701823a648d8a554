//! Masking rule engine
//!
//! This module turns a [`MaskingPolicy`] into a masked copy of a table:
//!
//! - **Rules**: one typed [`MaskingRule`] per field, validated on entry
//! - **Transforms**: per-value strategies ([`transform`]), including
//!   authenticated encryption ([`cipher`]) and synthetic data ([`synthetic`])
//! - **Engine**: field-by-field orchestration with progress and cancellation
//! - **Reverse store**: masked → original lookup for encrypted fields
//!
//! # Usage
//!
//! ```rust
//! use tabmask::masking::{MaskingPolicy, RuleDocument};
//!
//! let mut policy = MaskingPolicy::new();
//! policy.set_rule_document(
//!     "card_number",
//!     &RuleDocument::new("partial_mask")
//!         .with_option("keep_first", 0)
//!         .with_option("keep_last", 4),
//! )?;
//! assert_eq!(policy.len(), 1);
//! # Ok::<(), tabmask::domain::RuleError>(())
//! ```

pub mod cipher;
pub mod engine;
pub mod policy;
pub mod report;
pub mod rule;
pub mod store;
pub mod synthetic;
pub mod transform;

// Re-export main types
pub use cipher::{generate_key, EncryptionKey, FieldCipher, TokenEncoding};
pub use engine::{
    LoggingProgress, MaskingEngine, MaskingOutcome, MaskingProgress, NoProgress, ProgressSink,
};
pub use policy::MaskingPolicy;
pub use report::{FieldReport, MaskingSummary};
pub use rule::{MaskingRule, MaskingStrategy, RuleDocument};
pub use store::ReversibleStore;
pub use transform::{TransformOutcome, Transformed, ValueTransformer};
