//! Filtered views and summaries over merged observations.
//!
//! Every view is derived from the full merged table independently, so
//! filtering one metric never removes rows from another metric's view.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use data_reports_dataset::DatasetError;
use data_reports_epidemiology_models::{EpidemiologyObservation, Metric, SeriesPoint};

use crate::EpidemiologyError;

/// Rows where one metric is strictly positive.
#[must_use]
pub fn positive(
    observations: &[EpidemiologyObservation],
    metric: Metric,
) -> Vec<EpidemiologyObservation> {
    observations
        .iter()
        .filter(|o| o.get(metric).is_some_and(|v| v > 0))
        .cloned()
        .collect()
}

/// The three per-metric views used for charting.
#[derive(Debug, Clone, Default)]
pub struct FilteredViews {
    /// Rows with cases > 0.
    pub cases: Vec<EpidemiologyObservation>,
    /// Rows with deaths > 0.
    pub deaths: Vec<EpidemiologyObservation>,
    /// Rows with recoveries > 0.
    pub recovered: Vec<EpidemiologyObservation>,
}

impl FilteredViews {
    /// Builds every view from the same merged table.
    #[must_use]
    pub fn new(observations: &[EpidemiologyObservation]) -> Self {
        Self {
            cases: positive(observations, Metric::Cases),
            deaths: positive(observations, Metric::Deaths),
            recovered: positive(observations, Metric::Recovered),
        }
    }

    /// The view for one metric.
    #[must_use]
    pub fn get(&self, metric: Metric) -> &[EpidemiologyObservation] {
        match metric {
            Metric::Cases => &self.cases,
            Metric::Deaths => &self.deaths,
            Metric::Recovered => &self.recovered,
        }
    }
}

/// Worldwide total of one metric per date, ascending.
///
/// Sums the present values; a date where every country lacks the metric
/// is a gap.
///
/// # Errors
///
/// Returns [`EpidemiologyError::Dataset`] if a date's total overflows
/// `i64`.
pub fn global_totals(
    observations: &[EpidemiologyObservation],
    metric: Metric,
) -> Result<Vec<SeriesPoint>, EpidemiologyError> {
    let mut totals: BTreeMap<NaiveDate, Option<i64>> = BTreeMap::new();
    for observation in observations {
        let total = totals.entry(observation.date).or_insert(None);
        if let Some(value) = observation.get(metric) {
            let sum = total
                .unwrap_or(0)
                .checked_add(value)
                .ok_or_else(|| DatasetError::Parse {
                    message: format!("worldwide {metric} on {} overflows", observation.date),
                })?;
            *total = Some(sum);
        }
    }
    Ok(totals
        .into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect())
}

/// One country's series for one metric, ascending by date. Matching is
/// case-insensitive.
#[must_use]
pub fn country_series(
    observations: &[EpidemiologyObservation],
    country: &str,
    metric: Metric,
) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = observations
        .iter()
        .filter(|o| o.country.eq_ignore_ascii_case(country))
        .map(|o| SeriesPoint {
            date: o.date,
            value: o.get(metric),
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// The most recent observation of every country, ranked by cumulative
/// cases (descending, ties by name), truncated to `top`.
#[must_use]
pub fn latest_by_country(
    observations: &[EpidemiologyObservation],
    top: usize,
) -> Vec<EpidemiologyObservation> {
    let mut latest: BTreeMap<&str, &EpidemiologyObservation> = BTreeMap::new();
    for observation in observations {
        latest
            .entry(observation.country.as_str())
            .and_modify(|current| {
                if observation.date > current.date {
                    *current = observation;
                }
            })
            .or_insert(observation);
    }

    let mut ranked: Vec<EpidemiologyObservation> = latest.into_values().cloned().collect();
    ranked.sort_by(|a, b| {
        b.cases
            .unwrap_or(i64::MIN)
            .cmp(&a.cases.unwrap_or(i64::MIN))
            .then_with(|| a.country.cmp(&b.country))
    });
    ranked.truncate(top);
    ranked
}

/// First difference of a cumulative series.
///
/// The first point has no predecessor and is skipped. A difference
/// involving a gap, or one that overflows, is a gap. Negative differences
/// (downward revisions in the source) are kept.
#[must_use]
pub fn daily_new(series: &[SeriesPoint]) -> Vec<SeriesPoint> {
    series
        .windows(2)
        .map(|pair| SeriesPoint {
            date: pair[1].date,
            value: pair[1].value.zip(pair[0].value).and_then(|(b, a)| b.checked_sub(a)),
        })
        .collect()
}

/// The latest date with a value in a series.
#[must_use]
pub fn last_reported(series: &[SeriesPoint]) -> Option<SeriesPoint> {
    series.iter().rev().find(|p| p.value.is_some()).copied()
}
