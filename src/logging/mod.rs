//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels (`--log-level`, `RUST_LOG`)
//! - Console output on stderr
//! - JSON file logging with rotation
//!
//! Original values, masked values and keys are never logged; events carry
//! field names, strategies and counts only.
//!
//! # Example
//!
//! ```no_run
//! use tabmask::logging::init_logging;
//! use tabmask::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(rows = 50, "Table loaded");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LogRotation, LoggingGuard};

/// Log the start of a masking command
///
/// # Example
///
/// ```no_run
/// use tabmask::log_masking_start;
///
/// log_masking_start!("employees.csv", 3);
/// ```
#[macro_export]
macro_rules! log_masking_start {
    ($input:expr, $rules:expr) => {
        tracing::info!(
            input = %$input,
            rules = $rules,
            "Starting masking"
        );
    };
}

/// Log the completion of a masking command
///
/// # Example
///
/// ```no_run
/// use tabmask::log_masking_complete;
/// use std::time::Duration;
///
/// log_masking_complete!(50, 4, Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_masking_complete {
    ($rows:expr, $fields:expr, $duration:expr) => {
        tracing::info!(
            rows = $rows,
            fields = $fields,
            duration_ms = $duration.as_millis() as u64,
            "Masking completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use tabmask::log_error_with_context;
/// use tabmask::domain::TabmaskError;
///
/// let error = TabmaskError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
