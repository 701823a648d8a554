//! Domain models and types for tabmask.
//!
//! The domain layer provides:
//! - **Tabular data** ([`Table`], [`Column`], [`Scalar`])
//! - **Error types** ([`TabmaskError`] and the per-layer enums it wraps)
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Fallible operations at the orchestration level return [`Result<T, TabmaskError>`];
//! layer-specific errors convert with `?`:
//!
//! ```rust
//! use tabmask::domain::Result;
//! use tabmask::masking::MaskingPolicy;
//!
//! fn example() -> Result<MaskingPolicy> {
//!     let policy = MaskingPolicy::from_json_str(r#"{"email": {"type": "email_mask"}}"#)?;
//!     Ok(policy)
//! }
//! # example().unwrap();
//! ```

pub mod errors;
pub mod result;
pub mod table;

// Re-export commonly used types for convenience
pub use errors::{
    AdapterError, CipherError, MaskingError, PolicyError, RuleError, TableError, TabmaskError,
    TransformError,
};
pub use result::Result;
pub use table::{Column, Scalar, Table};
