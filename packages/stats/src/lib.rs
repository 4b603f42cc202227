#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Logistic regression and supporting numerics for the reports.
//!
//! [`logistic`] fits a binary logistic model by iteratively reweighted least
//! squares and reports Wald statistics per coefficient. [`linalg`] holds the
//! small dense matrix routines it needs and [`distribution`] the
//! complementary error function behind the p-values.

pub mod distribution;
pub mod linalg;
pub mod logistic;

use thiserror::Error;

/// Errors that can occur while fitting a model.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The normal equations have no unique solution (collinear predictors
    /// or a constant column).
    #[error("Design matrix is singular")]
    Singular,

    /// The iteration limit was reached before the deviance settled.
    #[error("Fit did not converge after {iterations} iterations")]
    NotConverged {
        /// Iterations performed.
        iterations: u32,
    },

    /// Inputs have inconsistent shapes.
    #[error("Dimension mismatch: {message}")]
    DimensionMismatch {
        /// Description of what went wrong.
        message: String,
    },

    /// No observations to fit.
    #[error("No observations")]
    Empty,
}
