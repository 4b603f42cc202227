//! Dataset registry: loads all dataset definitions from embedded TOML.
//!
//! Each `.toml` file in `packages/dataset/datasets/` is baked into the
//! binary at compile time via [`include_str!`].

use crate::DatasetError;
use crate::dataset_def::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("nypd_shooting", include_str!("../datasets/nypd_shooting.toml")),
    ("covid_confirmed", include_str!("../datasets/covid_confirmed.toml")),
    ("covid_deaths", include_str!("../datasets/covid_deaths.toml")),
    ("covid_recovered", include_str!("../datasets/covid_recovered.toml")),
];

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (the configs are embedded, so
/// this is caught by the registry tests).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up one dataset definition by id.
///
/// # Errors
///
/// Returns [`DatasetError::Definition`] if no dataset has that id.
pub fn dataset(id: &str) -> Result<DatasetDefinition, DatasetError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DatasetError::Definition {
            message: format!("unknown dataset '{id}'"),
        })
}
