//! Wide-to-long reshaping.
//!
//! Time series published with one column per date are melted into one row
//! per (identifying columns, date). Every column outside the exclusion set
//! is treated as a date column; headers are carried through verbatim and
//! parsed later by the consumer.

use data_reports_dataset_models::{LongRow, LongTable, Table};
use serde::Deserialize;

use crate::DatasetError;

/// Which columns identify an entity and which of those to keep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReshapeSpec {
    /// Non-date columns (identifiers and geography).
    pub exclude: Vec<String>,
    /// Subset of `exclude` carried into every long row, in this order.
    pub keep: Vec<String>,
}

/// Melts a wide table into a [`LongTable`].
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if a kept column is absent,
/// [`DatasetError::Definition`] if a kept column is not excluded, and
/// [`DatasetError::Parse`] if a date cell is not an integer count.
pub fn melt(table: &Table, spec: &ReshapeSpec) -> Result<LongTable, DatasetError> {
    if let Some(column) = spec.keep.iter().find(|k| !spec.exclude.contains(*k)) {
        return Err(DatasetError::Definition {
            message: format!("kept column '{column}' must also be excluded from melting"),
        });
    }

    let key_indices = spec
        .keep
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let date_columns: Vec<(usize, &str)> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !spec.exclude.contains(*name))
        .map(|(i, name)| (i, name.as_str()))
        .collect();

    let mut rows = Vec::with_capacity(table.len() * date_columns.len());

    for (row_idx, row) in table.rows.iter().enumerate() {
        let keys: Vec<Option<String>> = key_indices.iter().map(|&i| row[i].clone()).collect();

        for &(col_idx, date) in &date_columns {
            let value = row[col_idx]
                .as_deref()
                .map(|cell| {
                    parse_count(cell).ok_or_else(|| DatasetError::Parse {
                        message: format!(
                            "row {}: column '{date}' has non-integer value '{cell}'",
                            row_idx + 1
                        ),
                    })
                })
                .transpose()?;

            rows.push(LongRow {
                keys: keys.clone(),
                date: date.to_owned(),
                value,
            });
        }
    }

    log::debug!(
        "Melted {} wide rows x {} date columns into {} long rows",
        table.len(),
        date_columns.len(),
        rows.len()
    );

    Ok(LongTable {
        key_columns: spec.keep.clone(),
        rows,
    })
}

/// Parses an integer count, accepting whole-number decimals like `"12.0"`.
#[allow(clippy::cast_possible_truncation)]
fn parse_count(cell: &str) -> Option<i64> {
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    let f = cell.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}
