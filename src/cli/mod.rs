//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for tabmask using clap.

pub mod commands;

use crate::domain::{CipherError, MaskingError, TabmaskError};
use clap::{Parser, Subcommand};

/// Exit code for a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for configuration or policy errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for table or file I/O errors
pub const EXIT_IO: i32 = 3;
/// Exit code for a failed masking run
pub const EXIT_MASKING: i32 = 4;
/// Exit code for unexpected failures
pub const EXIT_FATAL: i32 = 5;
/// Exit code after a shutdown signal
pub const EXIT_CANCELLED: i32 = 130;

/// Process exit code for a failed command
///
/// Configuration, policy and key problems are the operator's to fix (2);
/// unreadable or unwritable files are 3; a run that failed while masking
/// is 4.
pub fn exit_code(error: &TabmaskError) -> i32 {
    match error {
        TabmaskError::Configuration(_) | TabmaskError::Rule(_) | TabmaskError::Policy(_) => {
            EXIT_CONFIG
        }
        TabmaskError::Adapter(_) | TabmaskError::Io(_) => EXIT_IO,
        TabmaskError::Masking(MaskingError::Cancelled { .. }) => EXIT_CANCELLED,
        TabmaskError::Masking(MaskingError::Failure { .. }) => EXIT_MASKING,
        TabmaskError::Cipher(CipherError::InvalidKey(_)) => EXIT_CONFIG,
        TabmaskError::Cipher(_) => EXIT_MASKING,
        TabmaskError::Serialization(_) => EXIT_FATAL,
    }
}

/// Tabmask - Tabular data masking tool
#[derive(Parser, Debug)]
#[command(name = "tabmask")]
#[command(version, about, long_about = None)]
#[command(author = "Tabmask Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tabmask.toml", env = "TABMASK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TABMASK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mask a table file with a policy
    Mask(commands::mask::MaskArgs),

    /// Validate a policy document, optionally against a table
    Validate(commands::validate::ValidateArgs),

    /// Create a starter configuration and policy
    Init(commands::init::InitArgs),

    /// Generate an encryption key for encrypt rules
    Keygen(commands::keygen::KeygenArgs),

    /// Decrypt a single encrypted value
    Reveal(commands::reveal::RevealArgs),

    /// Write a sample employee table
    Sample(commands::sample::SampleArgs),
}
