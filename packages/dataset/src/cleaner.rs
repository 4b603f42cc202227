//! Column selection, sentinel filling and categorical normalization.
//!
//! A [`CleaningPlan`] is applied as a fixed sequence of [`CleaningStage`]s.
//! Code substitution always runs before categorization, so malformed codes
//! are rewritten before a column is checked against its domain and never
//! show up as spurious categories.

use std::collections::{BTreeMap, BTreeSet};

use data_reports_dataset_models::{CleanTable, Table};
use serde::Deserialize;

use crate::DatasetError;

/// What to do to a raw table.
///
/// Every map is keyed by column name. A column listed in `fill`,
/// `substitute` or `domains` must also survive `select`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleaningPlan {
    /// Columns to keep, in output order. Empty keeps every column.
    #[serde(default)]
    pub select: Vec<String>,
    /// Replacement for missing cells. Columns absent here keep their gaps.
    #[serde(default)]
    pub fill: BTreeMap<String, String>,
    /// Invalid code → canonical code, per column.
    #[serde(default)]
    pub substitute: BTreeMap<String, BTreeMap<String, String>>,
    /// Declared levels of each categorical column.
    #[serde(default)]
    pub domains: BTreeMap<String, Vec<String>>,
}

/// One step of the cleaning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningStage {
    /// Keep only the selected columns.
    Select,
    /// Replace missing cells with their column's fill value.
    Fill,
    /// Rewrite invalid codes to canonical ones.
    Substitute,
    /// Check each categorical column against its declared domain.
    Categorize,
}

impl CleaningStage {
    /// The order in which stages run.
    pub const ORDER: &[Self] = &[Self::Select, Self::Fill, Self::Substitute, Self::Categorize];
}

/// Counters collected while cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Missing cells filled, per column.
    pub filled: BTreeMap<String, u64>,
    /// Cells rewritten by the substitution table, per column.
    pub substituted: BTreeMap<String, u64>,
    /// Values outside a declared domain, per column, in first-seen order.
    pub unrecognized: BTreeMap<String, Vec<String>>,
}

impl CleanReport {
    fn log(&self, label: &str) {
        for (column, count) in &self.filled {
            log::info!("[{label}] {column}: filled {count} missing values");
        }
        for (column, count) in &self.substituted {
            log::info!("[{label}] {column}: substituted {count} invalid codes");
        }
    }
}

/// Applies a [`CleaningPlan`] to a table.
pub struct Cleaner<'a> {
    label: &'a str,
    plan: &'a CleaningPlan,
}

impl<'a> Cleaner<'a> {
    /// Creates a cleaner; `label` prefixes log lines.
    #[must_use]
    pub const fn new(label: &'a str, plan: &'a CleaningPlan) -> Self {
        Self { label, plan }
    }

    /// Runs every stage in [`CleaningStage::ORDER`].
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] if the plan names a column
    /// the table does not have (or that `select` drops).
    pub fn clean(&self, table: Table) -> Result<(CleanTable, CleanReport), DatasetError> {
        let mut table = table;
        let mut report = CleanReport::default();

        for stage in CleaningStage::ORDER {
            match stage {
                CleaningStage::Select => table = self.select(table)?,
                CleaningStage::Fill => self.fill(&mut table, &mut report)?,
                CleaningStage::Substitute => self.substitute(&mut table, &mut report)?,
                CleaningStage::Categorize => self.categorize(&table, &mut report)?,
            }
        }

        report.log(self.label);

        Ok((CleanTable { table }, report))
    }

    fn select(&self, table: Table) -> Result<Table, DatasetError> {
        if self.plan.select.is_empty() {
            return Ok(table);
        }

        let indices = self
            .plan
            .select
            .iter()
            .map(|name| require_column(&table, name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut selected = Table::new(self.plan.select.clone());
        for mut row in table.rows {
            selected.push_row(indices.iter().map(|&i| row[i].take()).collect());
        }
        Ok(selected)
    }

    fn fill(&self, table: &mut Table, report: &mut CleanReport) -> Result<(), DatasetError> {
        for (column, value) in &self.plan.fill {
            let idx = require_column(table, column)?;
            let mut count = 0;
            for row in &mut table.rows {
                if row[idx].is_none() {
                    row[idx] = Some(value.clone());
                    count += 1;
                }
            }
            if count > 0 {
                report.filled.insert(column.clone(), count);
            }
        }
        Ok(())
    }

    fn substitute(&self, table: &mut Table, report: &mut CleanReport) -> Result<(), DatasetError> {
        for (column, codes) in &self.plan.substitute {
            let idx = require_column(table, column)?;
            let mut count = 0;
            for row in &mut table.rows {
                if let Some(value) = row[idx].as_deref()
                    && let Some(canonical) = codes.get(value)
                {
                    row[idx] = Some(canonical.clone());
                    count += 1;
                }
            }
            if count > 0 {
                report.substituted.insert(column.clone(), count);
            }
        }
        Ok(())
    }

    /// Values outside a column's domain are kept as-is; each distinct one is
    /// warned about once and listed in the report.
    fn categorize(&self, table: &Table, report: &mut CleanReport) -> Result<(), DatasetError> {
        for (column, declared) in &self.plan.domains {
            let idx = require_column(table, column)?;
            let mut known: BTreeSet<&str> = declared.iter().map(String::as_str).collect();
            let mut unrecognized = Vec::new();

            for value in table.column_values(idx).flatten() {
                if known.insert(value) {
                    log::warn!(
                        "[{}] {column}: value '{value}' is outside the declared domain, keeping as-is",
                        self.label
                    );
                    unrecognized.push(value.to_owned());
                }
            }

            if !unrecognized.is_empty() {
                report.unrecognized.insert(column.clone(), unrecognized);
            }
        }

        Ok(())
    }
}

fn require_column(table: &Table, name: &str) -> Result<usize, DatasetError> {
    table
        .column_index(name)
        .ok_or_else(|| DatasetError::MissingColumn {
            column: name.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn incidents() -> Table {
        let mut table = Table::new(
            ["KEY", "BORO", "PERP_AGE_GROUP", "PERP_SEX", "Latitude"]
                .map(String::from)
                .to_vec(),
        );
        table.push_row(vec![cell("1"), cell("BRONX"), None, None, None]);
        table.push_row(vec![
            cell("2"),
            cell("QUEENS"),
            cell("1020"),
            cell("M"),
            cell("40.7"),
        ]);
        table.push_row(vec![
            cell("3"),
            cell("BROOKLYN"),
            cell("18-24"),
            cell("F"),
            cell("40.6"),
        ]);
        table.push_row(vec![
            cell("4"),
            cell("BROOKLYN"),
            cell("940"),
            cell("U"),
            None,
        ]);
        table
    }

    fn plan() -> CleaningPlan {
        CleaningPlan {
            select: ["BORO", "PERP_AGE_GROUP", "PERP_SEX", "Latitude"]
                .map(String::from)
                .to_vec(),
            fill: BTreeMap::from([
                ("PERP_AGE_GROUP".to_string(), "UNKNOWN".to_string()),
                ("PERP_SEX".to_string(), "U".to_string()),
            ]),
            substitute: BTreeMap::from([(
                "PERP_AGE_GROUP".to_string(),
                BTreeMap::from([
                    ("1020".to_string(), "UNKNOWN".to_string()),
                    ("224".to_string(), "UNKNOWN".to_string()),
                    ("940".to_string(), "UNKNOWN".to_string()),
                ]),
            )]),
            domains: BTreeMap::from([(
                "PERP_AGE_GROUP".to_string(),
                ["<18", "18-24", "25-44", "45-64", "65+", "UNKNOWN"]
                    .map(String::from)
                    .to_vec(),
            )]),
        }
    }

    #[test]
    fn selects_columns_in_plan_order() {
        let (clean, _) = Cleaner::new("test", &plan()).clean(incidents()).unwrap();
        assert_eq!(
            clean.table.columns,
            vec!["BORO", "PERP_AGE_GROUP", "PERP_SEX", "Latitude"]
        );
        assert_eq!(clean.table.value(1, 0), Some("QUEENS"));
    }

    #[test]
    fn fills_only_configured_columns() {
        let (clean, report) = Cleaner::new("test", &plan()).clean(incidents()).unwrap();

        assert_eq!(clean.table.value(0, 1), Some("UNKNOWN"));
        assert_eq!(clean.table.value(0, 2), Some("U"));
        // Coordinates have no fill value and keep their gaps
        assert_eq!(clean.table.value(0, 3), None);
        assert_eq!(clean.table.value(3, 3), None);
        assert_eq!(report.filled["PERP_AGE_GROUP"], 1);
        assert_eq!(report.filled["PERP_SEX"], 1);
    }

    #[test]
    fn substitutes_malformed_codes_before_categorizing() {
        let (clean, report) = Cleaner::new("test", &plan()).clean(incidents()).unwrap();

        let ages: Vec<_> = clean.table.column_values(1).collect();
        assert_eq!(
            ages,
            vec![
                Some("UNKNOWN"),
                Some("UNKNOWN"),
                Some("18-24"),
                Some("UNKNOWN")
            ]
        );
        assert_eq!(report.substituted["PERP_AGE_GROUP"], 2);
        // The malformed codes were rewritten before the domain check saw them
        assert!(report.unrecognized.is_empty());
    }

    #[test]
    fn unknown_codes_pass_through_and_are_reported_once() {
        let mut table = incidents();
        table.rows[1][2] = cell("999");
        table.rows[2][2] = cell("999");
        table.rows[3][2] = cell("(null)");

        let (clean, report) = Cleaner::new("test", &plan()).clean(table).unwrap();

        assert_eq!(clean.table.value(1, 1), Some("999"));
        assert_eq!(clean.table.value(2, 1), Some("999"));
        assert_eq!(clean.table.value(3, 1), Some("(null)"));
        assert_eq!(report.unrecognized["PERP_AGE_GROUP"], vec!["999", "(null)"]);
        assert_eq!(report.unrecognized.len(), 1);
    }

    #[test]
    fn categorize_requires_its_column() {
        let mut plan = plan();
        plan.domains
            .insert("VIC_RACE".to_string(), vec!["BLACK".to_string()]);
        let err = Cleaner::new("test", &plan).clean(incidents()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { column } if column == "VIC_RACE"));
    }

    #[test]
    fn every_filled_column_is_complete() {
        let (clean, _) = Cleaner::new("test", &plan()).clean(incidents()).unwrap();
        for column in ["PERP_AGE_GROUP", "PERP_SEX"] {
            let idx = clean.table.column_index(column).unwrap();
            assert!(clean.table.column_values(idx).all(|v| v.is_some()));
        }
    }

    #[test]
    fn empty_select_keeps_all_columns() {
        let plan = CleaningPlan::default();
        let (clean, report) = Cleaner::new("test", &plan).clean(incidents()).unwrap();
        assert_eq!(clean.table.columns.len(), 5);
        assert!(report.unrecognized.is_empty());
    }

    #[test]
    fn missing_selected_column_is_an_error() {
        let mut plan = plan();
        plan.select.push("NOT_THERE".to_string());
        let err = Cleaner::new("test", &plan).clean(incidents()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { column } if column == "NOT_THERE"));
    }

    #[test]
    fn fill_on_dropped_column_is_an_error() {
        let mut plan = plan();
        plan.fill.insert("KEY".to_string(), "0".to_string());
        let err = Cleaner::new("test", &plan).clean(incidents()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { column } if column == "KEY"));
    }

    #[test]
    fn stage_order_puts_substitution_before_categorization() {
        let substitute = CleaningStage::ORDER
            .iter()
            .position(|s| *s == CleaningStage::Substitute)
            .unwrap();
        let categorize = CleaningStage::ORDER
            .iter()
            .position(|s| *s == CleaningStage::Categorize)
            .unwrap();
        assert!(substitute < categorize);
    }
}
