//! Logistic model of the murder flag.
//!
//! Predictors are perpetrator age group, sex and race, weekday, hour of
//! day, latitude and longitude. Categorical predictors are expanded into
//! indicator columns against a reference level:
//!
//! * age group, sex and race use the alphabetically first observed level
//! * weekday uses the first observed day in calendar order (Sunday)
//!
//! Rows without coordinates are left out of the fit.

use std::collections::BTreeSet;

use data_reports_incident_models::{IncidentRecord, Weekday};
use data_reports_stats::linalg::Matrix;
use data_reports_stats::logistic::{LogisticFit, LogisticRegression};

use crate::IncidentError;
use crate::columns::{PERP_AGE_GROUP, PERP_RACE, PERP_SEX};

/// Name of the intercept column.
pub const INTERCEPT: &str = "(Intercept)";

/// A design matrix ready for fitting.
#[derive(Debug, Clone)]
pub struct Design {
    /// One row per kept record, intercept first.
    pub matrix: Matrix,
    /// Column names.
    pub names: Vec<String>,
    /// Murder flag of each kept record.
    pub response: Vec<bool>,
    /// Reference level of each categorical predictor, `(predictor, level)`.
    pub references: Vec<(String, String)>,
    /// Records dropped for missing coordinates.
    pub dropped: usize,
}

/// Fitted murder model.
#[derive(Debug, Clone)]
pub struct MurderModel {
    /// Coefficients and deviances.
    pub fit: LogisticFit,
    /// Reference level of each categorical predictor.
    pub references: Vec<(String, String)>,
    /// Records dropped for missing coordinates.
    pub dropped: usize,
}

/// One categorical predictor: its name, levels in reference-first order and
/// how to read a record's level.
struct Factor<'a> {
    name: &'a str,
    levels: Vec<String>,
    level_of: fn(&IncidentRecord) -> String,
}

impl Factor<'_> {
    fn columns(&self) -> impl Iterator<Item = String> + '_ {
        self.levels
            .iter()
            .skip(1)
            .map(move |level| format!("{}={level}", self.name))
    }

    fn indicators(&self, record: &IncidentRecord, row: &mut Vec<f64>) {
        let level = (self.level_of)(record);
        for other in self.levels.iter().skip(1) {
            row.push(if *other == level { 1.0 } else { 0.0 });
        }
    }
}

fn alphabetical_levels(
    records: &[&IncidentRecord],
    f: fn(&IncidentRecord) -> String,
) -> Vec<String> {
    records
        .iter()
        .map(|r| f(r))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn age_level(r: &IncidentRecord) -> String {
    r.perp_age_group.as_str().to_owned()
}

fn sex_level(r: &IncidentRecord) -> String {
    r.perp_sex.as_str().to_owned()
}

fn race_level(r: &IncidentRecord) -> String {
    r.perp_race.as_str().to_owned()
}

fn weekday_level(r: &IncidentRecord) -> String {
    r.weekday().to_string()
}

/// Builds the design matrix for the murder model.
#[must_use]
pub fn design_matrix(records: &[IncidentRecord]) -> Design {
    let kept: Vec<&IncidentRecord> = records
        .iter()
        .filter(|r| r.latitude.is_some() && r.longitude.is_some())
        .collect();
    let dropped = records.len() - kept.len();

    let observed_days: BTreeSet<Weekday> = kept.iter().map(|r| r.weekday()).collect();
    let factors = [
        Factor {
            name: PERP_AGE_GROUP,
            levels: alphabetical_levels(&kept, age_level),
            level_of: age_level,
        },
        Factor {
            name: PERP_SEX,
            levels: alphabetical_levels(&kept, sex_level),
            level_of: sex_level,
        },
        Factor {
            name: PERP_RACE,
            levels: alphabetical_levels(&kept, race_level),
            level_of: race_level,
        },
        Factor {
            name: "weekday",
            levels: Weekday::ALL
                .iter()
                .filter(|d| observed_days.contains(*d))
                .map(ToString::to_string)
                .collect(),
            level_of: weekday_level,
        },
    ];

    let mut names = vec![INTERCEPT.to_owned()];
    for factor in &factors {
        names.extend(factor.columns());
    }
    names.extend(["hour", "latitude", "longitude"].map(String::from));

    let mut matrix = Matrix::zeros(kept.len(), names.len());
    let mut response = Vec::with_capacity(kept.len());

    for (i, record) in kept.iter().enumerate() {
        let mut row = Vec::with_capacity(names.len());
        row.push(1.0);
        for factor in &factors {
            factor.indicators(record, &mut row);
        }
        row.push(f64::from(record.hour()));
        row.push(record.latitude.unwrap_or_default());
        row.push(record.longitude.unwrap_or_default());

        for (j, value) in row.into_iter().enumerate() {
            matrix.set(i, j, value);
        }
        response.push(record.murder);
    }

    let references = factors
        .iter()
        .filter_map(|f| {
            f.levels
                .first()
                .map(|level| (f.name.to_owned(), level.clone()))
        })
        .collect();

    Design {
        matrix,
        names,
        response,
        references,
        dropped,
    }
}

/// Fits the murder model.
///
/// # Errors
///
/// Returns [`IncidentError::Model`] if the fit fails (no usable rows, a
/// singular design or non-convergence).
pub fn fit_murder_model(records: &[IncidentRecord]) -> Result<MurderModel, IncidentError> {
    let design = design_matrix(records);

    if design.dropped > 0 {
        log::info!(
            "Murder model: dropped {} of {} records without coordinates",
            design.dropped,
            records.len()
        );
    }

    let fit = LogisticRegression::new().fit(&design.matrix, &design.response, &design.names)?;

    log::info!(
        "Murder model: {} observations, residual deviance {:.2} (null {:.2}), AIC {:.2}",
        fit.observations,
        fit.residual_deviance,
        fit.null_deviance,
        fit.aic
    );

    Ok(MurderModel {
        fit,
        references: design.references,
        dropped: design.dropped,
    })
}
