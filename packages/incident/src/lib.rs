#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shooting incident pipeline.
//!
//! Loads the NYPD shooting dataset, cleans it with the plan from its
//! dataset definition, types each cleaned row as an
//! [`IncidentRecord`](data_reports_incident_models::IncidentRecord), then
//! aggregates ([`aggregate`]) and models ([`model`]) the records.

pub mod aggregate;
pub mod model;
pub mod records;

use std::sync::Arc;

use data_reports_dataset::cleaner::{CleanReport, Cleaner};
use data_reports_dataset::loader::load_dataset;
use data_reports_dataset::progress::ProgressCallback;
use data_reports_dataset::{DatasetDefinition, DatasetError, FetchOptions};
use data_reports_dataset_models::Table;
use data_reports_incident_models::IncidentRecord;
use data_reports_stats::StatsError;
use thiserror::Error;

/// Column names of the cleaned shooting table.
pub mod columns {
    /// Date of occurrence, `MM/DD/YYYY`.
    pub const OCCUR_DATE: &str = "OCCUR_DATE";
    /// Time of occurrence, `HH:MM:SS`.
    pub const OCCUR_TIME: &str = "OCCUR_TIME";
    /// Borough name.
    pub const BORO: &str = "BORO";
    /// Murder flag.
    pub const STATISTICAL_MURDER_FLAG: &str = "STATISTICAL_MURDER_FLAG";
    /// Perpetrator age group.
    pub const PERP_AGE_GROUP: &str = "PERP_AGE_GROUP";
    /// Perpetrator sex.
    pub const PERP_SEX: &str = "PERP_SEX";
    /// Perpetrator race.
    pub const PERP_RACE: &str = "PERP_RACE";
    /// Latitude (WGS84).
    pub const LATITUDE: &str = "Latitude";
    /// Longitude (WGS84).
    pub const LONGITUDE: &str = "Longitude";
}

/// Errors that can occur in the shooting pipeline.
#[derive(Debug, Error)]
pub enum IncidentError {
    /// A cleaned row could not be typed.
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord {
        /// 1-based data row number.
        row: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Loading or cleaning the dataset failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Fitting the murder model failed.
    #[error("Model error: {0}")]
    Model(#[from] StatsError),
}

/// Cleaned and typed shooting records plus the cleaning counters.
#[derive(Debug, Clone)]
pub struct Incidents {
    /// One record per shooting.
    pub records: Vec<IncidentRecord>,
    /// What the cleaner changed.
    pub report: CleanReport,
}

/// Downloads (or reads) the shooting dataset and returns typed records.
///
/// # Errors
///
/// Returns [`IncidentError`] if loading, cleaning or typing fails.
pub async fn load_incidents(
    definition: &DatasetDefinition,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Incidents, IncidentError> {
    let table = load_dataset(&definition.id, &definition.fetcher, options, progress).await?;
    prepare_incidents(definition, table)
}

/// Cleans a raw shooting table and types every row.
///
/// # Errors
///
/// Returns [`IncidentError`] if cleaning or typing fails.
pub fn prepare_incidents(
    definition: &DatasetDefinition,
    table: Table,
) -> Result<Incidents, IncidentError> {
    let (clean, report) = Cleaner::new(&definition.id, &definition.cleaning).clean(table)?;
    let records = records::incident_records(&clean)?;
    log::info!("[{}] Typed {} incident records", definition.id, records.len());
    Ok(Incidents { records, report })
}
