#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! COVID-19 time series pipeline.
//!
//! The confirmed, deaths and recovered tables are loaded independently,
//! melted to long form, summed per (country, date) and outer-joined into
//! one [`EpidemiologyObservation`] per key. [`views`] derives the filtered
//! views and summaries the report charts.

pub mod merge;
pub mod views;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use data_reports_dataset::loader::load_dataset;
use data_reports_dataset::progress::ProgressCallback;
use data_reports_dataset::reshape::melt;
use data_reports_dataset::{DatasetDefinition, DatasetError, FetchOptions};
use data_reports_dataset_models::Table;
use data_reports_epidemiology_models::{EpidemiologyObservation, Metric};
use thiserror::Error;

use crate::merge::{RawKey, outer_merge, sum_by_country};

/// Errors that can occur in the epidemiology pipeline.
#[derive(Debug, Error)]
pub enum EpidemiologyError {
    /// A date column header is not an `M/D/YY` date.
    #[error("Invalid date header '{value}'")]
    InvalidDate {
        /// The header as published.
        value: String,
    },

    /// Two date headers resolve to the same (country, date) key.
    #[error("Duplicate observation for {country} on {date}")]
    DuplicateKey {
        /// Country/Region.
        country: String,
        /// The clashing date.
        date: NaiveDate,
    },

    /// Loading or reshaping a dataset failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Melts one metric's wide table and sums it per (country, date).
///
/// # Errors
///
/// Returns [`EpidemiologyError::Dataset`] if the definition has no reshape
/// section or the table cannot be melted.
pub fn metric_sums(
    definition: &DatasetDefinition,
    table: &Table,
) -> Result<BTreeMap<RawKey, Option<i64>>, EpidemiologyError> {
    let spec = definition
        .reshape
        .as_ref()
        .ok_or_else(|| DatasetError::Definition {
            message: format!("{} has no [reshape] section", definition.id),
        })?;
    let long = melt(table, spec)?;
    let sums = sum_by_country(&long)?;
    log::info!(
        "[{}] {} long rows summed into {} (country, date) keys",
        definition.id,
        long.rows.len(),
        sums.len()
    );
    Ok(sums)
}

/// Loads every metric's table and merges them into observations ordered
/// by (country, date).
///
/// Tables are fetched one after another.
///
/// # Errors
///
/// Returns [`EpidemiologyError`] if any load, reshape or merge step fails.
pub async fn load_observations(
    sources: &[(Metric, DatasetDefinition)],
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<EpidemiologyObservation>, EpidemiologyError> {
    let mut sums = BTreeMap::new();

    for (metric, definition) in sources {
        let table = load_dataset(&definition.id, &definition.fetcher, options, progress).await?;
        sums.insert(*metric, metric_sums(definition, &table)?);
    }

    let observations = outer_merge(&sums)?;
    log::info!("Merged {} observations", observations.len());
    Ok(observations)
}
