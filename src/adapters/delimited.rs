//! Delimited text tables
//!
//! The first record is the header. Cells are typed on load: an empty cell is
//! null, then integer, then finite float, otherwise text. Dates stay text.

use super::traits::{io_error, TableSink, TableSource};
use crate::domain::{AdapterError, Column, Scalar, Table};
use std::fs::File;
use std::path::Path;

/// CSV reader/writer with a configurable delimiter
#[derive(Debug, Clone, Copy)]
pub struct DelimitedTable {
    delimiter: u8,
}

impl DelimitedTable {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for DelimitedTable {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TableSource for DelimitedTable {
    fn load(&self, path: &Path) -> Result<Table, AdapterError> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut values: Vec<Vec<Scalar>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (column, cell) in values.iter_mut().zip(record.iter()) {
                column.push(parse_cell(cell));
            }
        }

        let columns = headers
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        let table = Table::new(columns)?;

        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "Loaded delimited table"
        );
        Ok(table)
    }
}

impl TableSink for DelimitedTable {
    fn save(&self, table: &Table, path: &Path) -> Result<(), AdapterError> {
        let file = File::create(path).map_err(|e| io_error(path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);

        writer.write_record(table.column_names())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
        writer.flush().map_err(|e| io_error(path, e))?;

        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            "Saved delimited table"
        );
        Ok(())
    }
}

/// Type a raw cell
pub fn parse_cell(cell: &str) -> Scalar {
    if cell.is_empty() {
        return Scalar::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Scalar::Integer(i);
    }
    match cell.parse::<f64>() {
        Ok(f) if f.is_finite() => Scalar::Float(f),
        _ => Scalar::Text(cell.to_string()),
    }
}
