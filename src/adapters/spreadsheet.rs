//! Excel workbook tables
//!
//! Loads the first worksheet of an `.xlsx` file and writes a single-sheet
//! workbook. The first row is the header. Empty cells are null on load and
//! null values are left empty on save, matching the delimited adapter.
//!
//! Numbers without a fractional part load as integers, since workbooks store
//! every number as a float. Date cells load as dates; dates are saved as
//! `YYYY-MM-DD` text, the same form the delimited adapter writes. A trailing
//! row whose cells are all null is not kept, as the workbook has nothing to
//! store for it.

use super::traits::{io_error, TableSink, TableSource};
use crate::domain::{AdapterError, Column, Scalar, Table};
use calamine::{Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Worksheet limits of the xlsx format
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Largest magnitude at which every integer is exactly representable in f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Reads and writes `.xlsx` workbooks
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetTable;

impl SpreadsheetTable {
    pub fn new() -> Self {
        Self
    }
}

impl TableSource for SpreadsheetTable {
    fn load(&self, path: &Path) -> Result<Table, AdapterError> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let mut workbook: Xlsx<_> =
            Xlsx::new(BufReader::new(file)).map_err(|e| spreadsheet_error(path, e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                AdapterError::Spreadsheet(format!("{} has no worksheets", path.display()))
            })?
            .map_err(|e| spreadsheet_error(path, e))?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Table::default());
        };
        let headers: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(index, cell)| header_name(index, cell))
            .collect();

        let mut values: Vec<Vec<Scalar>> = vec![Vec::new(); headers.len()];
        for row in rows {
            for (index, column) in values.iter_mut().enumerate() {
                column.push(row.get(index).map_or(Scalar::Null, cell_to_scalar));
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
            "Loaded spreadsheet table"
        );
        Ok(table)
    }
}

impl TableSink for SpreadsheetTable {
    fn save(&self, table: &Table, path: &Path) -> Result<(), AdapterError> {
        if table.row_count() >= MAX_ROWS || table.column_count() > MAX_COLUMNS {
            return Err(AdapterError::Spreadsheet(format!(
                "{} rows x {} columns does not fit in a worksheet",
                table.row_count(),
                table.column_count()
            )));
        }

        let mut workbook = Workbook::new();
        write_sheet(workbook.add_worksheet(), table).map_err(|e| spreadsheet_error(path, e))?;
        workbook.save(path).map_err(|e| spreadsheet_error(path, e))?;

        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            "Saved spreadsheet table"
        );
        Ok(())
    }
}

fn write_sheet(sheet: &mut Worksheet, table: &Table) -> Result<(), XlsxError> {
    for (col, name) in table.column_names().into_iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }
    for (index, row) in table.rows().enumerate() {
        let row_num = (index + 1) as u32;
        for (col, value) in row.into_iter().enumerate() {
            write_cell(sheet, row_num, col as u16, value)?;
        }
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Scalar) -> Result<(), XlsxError> {
    match value {
        Scalar::Null => {}
        Scalar::Text(text) => {
            sheet.write_string(row, col, text)?;
        }
        Scalar::Integer(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        Scalar::Float(f) => {
            sheet.write_number(row, col, *f)?;
        }
        Scalar::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Scalar::Date(_) => {
            sheet.write_string(row, col, value.to_string())?;
        }
    }
    Ok(())
}

fn header_name(index: usize, cell: &Data) -> String {
    match cell {
        Data::Empty => format!("column_{}", index + 1),
        other => other.to_string(),
    }
}

/// Type a workbook cell
pub fn cell_to_scalar(cell: &Data) -> Scalar {
    match cell {
        Data::Empty | Data::Error(_) => Scalar::Null,
        Data::String(s) if s.is_empty() => Scalar::Null,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Scalar::Text(s.clone()),
        Data::Int(i) => Scalar::Integer(*i),
        Data::Float(f) => number_to_scalar(*f),
        Data::Bool(b) => Scalar::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_date(serial).map_or_else(|| number_to_scalar(serial), Scalar::Date)
        }
    }
}

fn number_to_scalar(value: f64) -> Scalar {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        Scalar::Integer(value as i64)
    } else {
        Scalar::Float(value)
    }
}

/// Date of an Excel serial day number (1900 date system)
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn spreadsheet_error(path: &Path, err: impl fmt::Display) -> AdapterError {
    AdapterError::Spreadsheet(format!("{}: {err}", path.display()))
}
