//! Configuration management for tabmask.
//!
//! # Overview
//!
//! tabmask reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TABMASK_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run mode
//! - [`MaskingConfig`] - Random seed, reverse-mapping export, progress logging
//! - [`IoConfig`] - Delimited-text settings
//! - [`LoggingConfig`] - Rolling file logs
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! dry_run = false
//!
//! [masking]
//! seed = 42
//! reverse_mapping_path = "${TABMASK_OUTPUT_DIR}/reverse_mapping.json"
//!
//! [io]
//! csv_delimiter = ","
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! local_rotation = "daily"
//! ```
//!
//! # Loading
//!
//! ```rust,no_run
//! use tabmask::config::load_config_or_default;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("tabmask.toml")?;
//! println!("Delimiter: {:?}", config.io.csv_delimiter);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{ApplicationConfig, IoConfig, LoggingConfig, MaskingConfig, TabmaskConfig};
pub use secret::{secret_from_env, secret_string, KeyMaterial, SecretString};
