#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory tabular types shared by the report pipelines.
//!
//! A [`Table`] is what the loader produces: string cells keyed by header,
//! with `None` as the explicit missing marker. The cleaner turns it into a
//! [`CleanTable`] whose categorical columns have been checked against their
//! declared domains, and the reshaper turns a wide table into a
//! [`LongTable`].

use serde::{Deserialize, Serialize};

/// A rectangular table of optional string cells.
///
/// Every row has exactly `columns.len()` cells. `None` marks a missing value
/// (an empty field in the source CSV) and is never confused with a valid
/// categorical label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Column headers in source order.
    pub columns: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Creates an empty table with the given headers.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with missing cells and dropping
    /// cells beyond the header width.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Returns the position of a column by header name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the cell at `row`/`column`, or `None` when the cell is
    /// missing or out of range.
    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Iterates over the cells of one column.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).and_then(Option::as_deref))
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output of the cleaning pipeline.
///
/// Only the cleaner builds one, so holding a `CleanTable` means every stage
/// has run: filled columns have no gaps and substituted codes are gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanTable {
    /// The cleaned cells, restricted to the selected columns.
    pub table: Table,
}

/// One long-form observation produced by melting a wide table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRow {
    /// Values of the kept identifying columns, in [`LongTable::key_columns`]
    /// order.
    pub keys: Vec<Option<String>>,
    /// The original, unparsed header of the melted column (e.g. `"1/22/20"`).
    pub date: String,
    /// The cell value, `None` when the wide cell was missing.
    pub value: Option<i64>,
}

/// A long-form table: identifying columns plus one `(date, value)` pair per
/// row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTable {
    /// Names of the identifying columns carried into every row.
    pub key_columns: Vec<String>,
    /// Melted rows, grouped by source row then by date column order.
    pub rows: Vec<LongRow>,
}

impl LongTable {
    /// Returns the position of an identifying column.
    #[must_use]
    pub fn key_index(&self, name: &str) -> Option<usize> {
        self.key_columns.iter().position(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_pads_and_truncates() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![Some("1".to_string())]);
        table.push_row(vec![
            Some("1".to_string()),
            Some("2".to_string()),
            Some("3".to_string()),
        ]);

        assert_eq!(table.rows[0], vec![Some("1".to_string()), None]);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn value_distinguishes_missing_cells() {
        let mut table = Table::new(vec!["a".to_string()]);
        table.push_row(vec![None]);
        table.push_row(vec![Some("x".to_string())]);

        assert_eq!(table.value(0, 0), None);
        assert_eq!(table.value(1, 0), Some("x"));
        assert_eq!(table.value(5, 0), None);
        assert_eq!(
            table.column_values(0).collect::<Vec<_>>(),
            vec![None, Some("x")]
        );
    }
}
