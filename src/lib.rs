// Tabmask - Tabular Data Masking Tool
// Copyright (c) 2025 Tabmask Contributors
// Licensed under the MIT License

//! # Tabmask - Tabular Data Masking
//!
//! Tabmask masks sensitive columns of a table according to a per-field
//! policy, producing a new table and, for encrypted fields, a reverse mapping
//! from masked value to original.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Declaring** a [`MaskingPolicy`](masking::MaskingPolicy): one rule per field, validated on entry
//! - **Masking** a [`Table`](domain::Table) with eleven strategies, from full masking to AES-GCM encryption
//! - **Reversing** encrypted values through the [`ReversibleStore`](masking::ReversibleStore)
//! - **Moving tables** to and from CSV and JSON files
//!
//! ## Architecture
//!
//! Tabmask follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`masking`] - Rules, value transforms, the engine and the reverse store
//! - [`adapters`] - Table sources and sinks (CSV, JSON), sample data
//! - [`domain`] - Table model and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabmask::adapters::{load_table, save_table};
//! use tabmask::config::IoConfig;
//! use tabmask::masking::{LoggingProgress, MaskingEngine, MaskingPolicy, ReversibleStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let io = IoConfig::default();
//!     let table = load_table("employees.csv", &io)?;
//!     let policy = MaskingPolicy::load("masking_rules.json")?;
//!
//!     let store = ReversibleStore::new();
//!     let outcome = MaskingEngine::new().apply(&table, &policy, &store, &mut LoggingProgress)?;
//!
//!     save_table(&outcome.table, "masked.csv", &io)?;
//!     store.export_to_file("reverse_mapping.json")?;
//!     println!("{}", outcome.summary.format_console());
//!     Ok(())
//! }
//! ```
//!
//! ## Policy Documents
//!
//! Policies are JSON objects keyed by field name. Each rule names a strategy
//! and its options:
//!
//! ```json
//! {
//!   "email": { "type": "email_mask" },
//!   "card_number": { "type": "partial_mask", "options": { "keep_first": 0, "keep_last": 4 } },
//!   "ssn": { "type": "reversible_encrypt", "options": { "key": "<tabmask keygen>" } }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Each layer has its own error enum; [`domain::TabmaskError`] wraps them all:
//!
//! ```rust,no_run
//! use tabmask::domain::TabmaskError;
//! use tabmask::masking::MaskingPolicy;
//!
//! fn example() -> Result<(), TabmaskError> {
//!     // Errors are converted with the ? operator
//!     let policy = MaskingPolicy::load("masking_rules.json")?;
//!     println!("{} rules", policy.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Tabmask uses structured logging with the `tracing` crate. Events carry
//! field names, strategies and counts, never cell values or keys.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod masking;
