//! In-memory tabular data
//!
//! A [`Table`] is an ordered list of named [`Column`]s of equal length. Row
//! order is significant and preserved by every operation; column order is
//! kept for presentation.

use super::errors::TableError;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Missing value; rendered as an empty field by sinks
    Null,
    /// Free text
    Text(String),
    /// Whole number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// Calendar date
    Date(NaiveDate),
}

impl Scalar {
    /// Check whether this is the null sentinel
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// A named column of values in row order
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Scalar>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, values: Vec<Scalar>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in row order
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the column has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn replace_values(&mut self, values: Vec<Scalar>) {
        self.values = values;
    }
}

/// Ordered collection of equal-length named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table, checking that column names are unique and lengths agree
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`] or [`TableError::RaggedColumns`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tabmask::domain::{Column, Scalar, Table};
    ///
    /// let table = Table::new(vec![
    ///     Column::new("name", vec![Scalar::from("Ada"), Scalar::from("Grace")]),
    ///     Column::new("age", vec![Scalar::from(36_i64), Scalar::Null]),
    /// ])?;
    /// assert_eq!(table.row_count(), 2);
    /// # Ok::<(), tabmask::domain::TableError>(())
    /// ```
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::with_capacity(columns.len());

        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(TableError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != rows {
                return Err(TableError::RaggedColumns {
                    column: column.name().to_string(),
                    expected: rows,
                    found: column.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in presentation order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in presentation order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Check whether a column exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Values of row `index` in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Scalar>> {
        if index >= self.rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Iterate over rows in order
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Scalar>> + '_ {
        (0..self.rows).map(move |i| self.columns.iter().map(|c| &c.values[i]).collect())
    }

    /// Return a copy of this table with the values of `name` replaced
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingColumn`] if no column has that name and
    /// [`TableError::RaggedColumns`] if `values` has the wrong length.
    pub fn with_column_replaced(&self, name: &str, values: Vec<Scalar>) -> Result<Self, TableError> {
        if values.len() != self.rows {
            return Err(TableError::RaggedColumns {
                column: name.to_string(),
                expected: self.rows,
                found: values.len(),
            });
        }
        let mut table = self.clone();
        let column = table
            .columns
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
        column.replace_values(values);
        Ok(table)
    }

    /// Rebuild from columns that were derived from this table's columns
    /// without changing any length or name.
    pub(crate) fn from_derived(columns: Vec<Column>, rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new("id", vec![Scalar::from(1_i64), Scalar::from(2_i64)]),
            Column::new("email", vec![Scalar::from("a@x.io"), Scalar::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_shape() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_names(), vec!["id", "email"]);
        assert!(table.contains_column("email"));
        assert!(!table.contains_column("Email"));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Table::new(vec![
            Column::new("a", vec![Scalar::Null]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::RaggedColumns {
                column: "b".to_string(),
                expected: 1,
                found: 0
            }
        );
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Table::new(vec![
            Column::new("a", vec![]),
            Column::new("a", vec![]),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn test_with_column_replaced_leaves_source_untouched() {
        let table = sample();
        let replaced = table
            .with_column_replaced("email", vec![Scalar::from("****"), Scalar::Null])
            .unwrap();

        assert_eq!(replaced.column("email").unwrap().values()[0], Scalar::from("****"));
        assert_eq!(table.column("email").unwrap().values()[0], Scalar::from("a@x.io"));
        assert_eq!(
            table.with_column_replaced("phone", vec![Scalar::Null, Scalar::Null]),
            Err(TableError::MissingColumn("phone".to_string()))
        );
        assert!(table.with_column_replaced("email", vec![]).is_err());
    }

    #[test]
    fn test_rows_in_order() {
        let table = sample();
        let rows: Vec<Vec<String>> = table
            .rows()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["1", "a@x.io"], vec!["2", ""]]);
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_scalar_canonical_strings() {
        assert_eq!(Scalar::from(42_i64).to_string(), "42");
        assert_eq!(Scalar::from(1234.57).to_string(), "1234.57");
        assert_eq!(Scalar::from(true).to_string(), "true");
        let date = NaiveDate::from_ymd_opt(1990, 3, 7).unwrap();
        assert_eq!(Scalar::from(date).to_string(), "1990-03-07");
        assert_eq!(Scalar::Null.to_string(), "");
        assert_eq!(Scalar::from(None::<i64>), Scalar::Null);
    }
}
