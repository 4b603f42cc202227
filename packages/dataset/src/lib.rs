#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loading, cleaning and reshaping for the report pipelines.
//!
//! Every dataset a report consumes is described by a [`DatasetDefinition`]
//! embedded from TOML (see [`registry`]). The definition says where the CSV
//! lives ([`loader`]), how to clean it ([`cleaner`]) and, for wide time
//! series, how to melt it into long form ([`reshape`]).

pub mod cleaner;
pub mod dataset_def;
pub mod loader;
pub mod progress;
pub mod registry;
pub mod reshape;

pub use dataset_def::DatasetDefinition;

/// Errors that can occur while loading or transforming a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (local file read, decompression).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured column is not present in the table.
    #[error("Column '{column}' not found")]
    MissingColumn {
        /// The column that was looked up.
        column: String,
    },

    /// A cell or header could not be interpreted.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },

    /// A dataset definition is malformed or inconsistent.
    #[error("Invalid dataset definition: {message}")]
    Definition {
        /// Description of what went wrong.
        message: String,
    },
}

/// Per-run options for loading a dataset.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Maximum number of records to keep across all of a dataset's files.
    pub limit: Option<u64>,
}
