//! Table source and sink abstractions
//!
//! Adapters load a file into a [`Table`] and write one back. They own column
//! typing and the null representation; the masking core only sees the
//! resulting table.

use crate::domain::{AdapterError, Table};
use std::fmt;
use std::path::Path;

/// Loads tables from files
pub trait TableSource {
    /// Read the file at `path` into a table
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] for unreadable files, malformed content, or
    /// rows that do not form a valid table.
    fn load(&self, path: &Path) -> Result<Table, AdapterError>;
}

/// Writes tables to files
pub trait TableSink {
    /// Write `table` to `path`, preserving row and column order
    ///
    /// Null values are written as empty fields (or JSON `null`).
    fn save(&self, table: &Table, path: &Path) -> Result<(), AdapterError>;
}

/// Supported table file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Delimited text (`.csv`, `.tsv`, `.txt`)
    Delimited,
    /// JSON array of row objects (`.json`)
    JsonRows,
    /// Excel workbook (`.xlsx`), first worksheet only
    Spreadsheet,
}

impl TableFormat {
    /// Pick a format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, AdapterError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") | Some("tsv") | Some("txt") => Ok(TableFormat::Delimited),
            Some("json") => Ok(TableFormat::JsonRows),
            Some("xlsx") => Ok(TableFormat::Spreadsheet),
            _ => Err(AdapterError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFormat::Delimited => write!(f, "delimited"),
            TableFormat::JsonRows => write!(f, "json"),
            TableFormat::Spreadsheet => write!(f, "xlsx"),
        }
    }
}

pub(crate) fn io_error(path: &Path, err: impl fmt::Display) -> AdapterError {
    AdapterError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
