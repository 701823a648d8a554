//! Table sources and sinks for tabmask.
//!
//! The masking core works on in-memory [`Table`](crate::domain::Table)s.
//! This module provides the collaborators that move tables to and from files:
//!
//! - [`delimited`] - CSV and other delimited text
//! - [`json_rows`] - JSON arrays of row objects
//! - [`spreadsheet`] - Excel workbooks
//! - [`sample`] - Generated employee data for trying out policies
//!
//! # Design Pattern
//!
//! Adapters implement the [`TableSource`] and [`TableSink`] traits so the CLI
//! can pick one from a file extension without knowing the format:
//!
//! ```rust,no_run
//! use tabmask::adapters::{load_table, save_table};
//! use tabmask::config::IoConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let io = IoConfig::default();
//! let table = load_table("employees.csv", &io)?;
//! save_table(&table, "employees.json", &io)?;
//! # Ok(())
//! # }
//! ```

pub mod delimited;
pub mod factory;
pub mod json_rows;
pub mod sample;
pub mod spreadsheet;
pub mod traits;

pub use delimited::DelimitedTable;
pub use factory::{create_sink, create_source, format_for_path, load_table, save_table};
pub use json_rows::JsonRowsTable;
pub use sample::generate_employee_table;
pub use spreadsheet::SpreadsheetTable;
pub use traits::{TableFormat, TableSink, TableSource};
