//! Table adapter factory
//!
//! Picks a source or sink from a file's extension and the I/O configuration.

use super::delimited::DelimitedTable;
use super::json_rows::JsonRowsTable;
use super::spreadsheet::SpreadsheetTable;
use super::traits::{TableFormat, TableSink, TableSource};
use crate::config::IoConfig;
use crate::domain::{AdapterError, Table};
use std::path::Path;

/// Resolve the table format for `path`
///
/// # Errors
///
/// Returns [`AdapterError::UnsupportedFormat`] for unknown extensions.
pub fn format_for_path(path: impl AsRef<Path>) -> Result<TableFormat, AdapterError> {
    TableFormat::from_path(path.as_ref())
}

/// Create a table source for the given format
pub fn create_source(format: TableFormat, io: &IoConfig) -> Box<dyn TableSource + Send + Sync> {
    match format {
        TableFormat::Delimited => Box::new(DelimitedTable::new(io.delimiter_byte())),
        TableFormat::JsonRows => Box::new(JsonRowsTable::new()),
        TableFormat::Spreadsheet => Box::new(SpreadsheetTable::new()),
    }
}

/// Create a table sink for the given format
pub fn create_sink(format: TableFormat, io: &IoConfig) -> Box<dyn TableSink + Send + Sync> {
    match format {
        TableFormat::Delimited => Box::new(DelimitedTable::new(io.delimiter_byte())),
        TableFormat::JsonRows => Box::new(JsonRowsTable::new()),
        TableFormat::Spreadsheet => Box::new(SpreadsheetTable::new()),
    }
}

/// Load a table, choosing the adapter from the extension
pub fn load_table(path: impl AsRef<Path>, io: &IoConfig) -> Result<Table, AdapterError> {
    let path = path.as_ref();
    let format = format_for_path(path)?;
    tracing::debug!(path = %path.display(), format = %format, "Loading table");
    create_source(format, io).load(path)
}

/// Save a table, choosing the adapter from the extension
pub fn save_table(table: &Table, path: impl AsRef<Path>, io: &IoConfig) -> Result<(), AdapterError> {
    let path = path.as_ref();
    let format = format_for_path(path)?;
    tracing::debug!(path = %path.display(), format = %format, "Saving table");
    create_sink(format, io).save(table, path)
}
