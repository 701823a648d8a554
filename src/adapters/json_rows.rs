//! JSON row tables
//!
//! A table is stored as an array of flat objects. Columns follow the order in
//! which keys first appear; a row missing a key gets null for that column.

use super::traits::{io_error, TableSink, TableSource};
use crate::domain::{AdapterError, Column, Scalar, Table};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::path::Path;

/// Reads and writes `[{"col": value, ...}, ...]` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRowsTable;

impl JsonRowsTable {
    pub fn new() -> Self {
        Self
    }

    /// Build a table from an already-parsed document
    pub fn from_value(document: Value) -> Result<Table, AdapterError> {
        let rows = match document {
            Value::Array(rows) => rows,
            other => {
                return Err(AdapterError::Json(format!(
                    "expected an array of row objects, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut columns: IndexMap<String, Vec<Scalar>> = IndexMap::new();

        for (index, row) in rows.into_iter().enumerate() {
            let Value::Object(object) = row else {
                return Err(AdapterError::Json(format!("row {index} is not an object")));
            };
            for (key, value) in object {
                let cell = json_to_scalar(&key, value)?;
                let column = columns
                    .entry(key)
                    .or_insert_with(|| vec![Scalar::Null; index]);
                column.push(cell);
            }
            for column in columns.values_mut() {
                if column.len() < index + 1 {
                    column.push(Scalar::Null);
                }
            }
        }

        let columns = columns
            .into_iter()
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Ok(Table::new(columns)?)
    }

    /// Render a table as a JSON document
    pub fn to_value(table: &Table) -> Value {
        let names = table.column_names();
        let rows = table
            .rows()
            .map(|row| {
                let object: Map<String, Value> = names
                    .iter()
                    .zip(row)
                    .map(|(name, value)| (name.to_string(), scalar_to_json(value)))
                    .collect();
                Value::Object(object)
            })
            .collect();
        Value::Array(rows)
    }
}

impl TableSource for JsonRowsTable {
    fn load(&self, path: &Path) -> Result<Table, AdapterError> {
        let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| AdapterError::Json(e.to_string()))?;
        let table = Self::from_value(document)?;

        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "Loaded JSON table"
        );
        Ok(table)
    }
}

impl TableSink for JsonRowsTable {
    fn save(&self, table: &Table, path: &Path) -> Result<(), AdapterError> {
        let content = serde_json::to_string_pretty(&Self::to_value(table))
            .map_err(|e| AdapterError::Json(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| io_error(path, e))?;

        tracing::debug!(path = %path.display(), rows = table.row_count(), "Saved JSON table");
        Ok(())
    }
}

fn json_to_scalar(key: &str, value: Value) -> Result<Scalar, AdapterError> {
    match value {
        Value::Null => Ok(Scalar::Null),
        Value::Bool(b) => Ok(Scalar::Bool(b)),
        Value::String(s) => Ok(Scalar::Text(s)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Scalar::Float(f))
            } else {
                Err(AdapterError::Json(format!(
                    "number in column '{key}' is out of range"
                )))
            }
        }
        Value::Array(_) | Value::Object(_) => Err(AdapterError::Json(format!(
            "column '{key}' holds a nested value; only scalars are supported"
        ))),
    }
}

fn scalar_to_json(value: &Scalar) -> Value {
    match value {
        Scalar::Null => Value::Null,
        Scalar::Text(s) => Value::String(s.clone()),
        Scalar::Integer(i) => Value::Number((*i).into()),
        Scalar::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Date(_) => Value::String(value.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
