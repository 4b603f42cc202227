#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! COVID-19 time series observation types.
//!
//! Every count is cumulative and optional. `None` means the source table
//! had no value for that (country, date) key, which is not the same as a
//! reported zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the three published time series.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Confirmed cases.
    Cases,
    /// Deaths.
    Deaths,
    /// Recoveries.
    Recovered,
}

impl Metric {
    /// Every metric, in merge order.
    pub const ALL: &[Self] = &[Self::Cases, Self::Deaths, Self::Recovered];

    /// Id of the dataset definition that publishes this metric.
    #[must_use]
    pub const fn dataset_id(self) -> &'static str {
        match self {
            Self::Cases => "covid_confirmed",
            Self::Deaths => "covid_deaths",
            Self::Recovered => "covid_recovered",
        }
    }

    /// Human-readable name for chart titles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cases => "Confirmed cases",
            Self::Deaths => "Deaths",
            Self::Recovered => "Recoveries",
        }
    }
}

/// Cumulative counts for one country on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpidemiologyObservation {
    /// Country/Region as published.
    pub country: String,
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Cumulative confirmed cases.
    pub cases: Option<i64>,
    /// Cumulative deaths.
    pub deaths: Option<i64>,
    /// Cumulative recoveries.
    pub recovered: Option<i64>,
}

impl EpidemiologyObservation {
    /// The value of one metric.
    #[must_use]
    pub const fn get(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Cases => self.cases,
            Metric::Deaths => self.deaths,
            Metric::Recovered => self.recovered,
        }
    }

    /// Sets the value of one metric.
    pub const fn set(&mut self, metric: Metric, value: Option<i64>) {
        match metric {
            Metric::Cases => self.cases = value,
            Metric::Deaths => self.deaths = value,
            Metric::Recovered => self.recovered = value,
        }
    }
}

/// One point of a dated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Date of the point.
    pub date: NaiveDate,
    /// Value, `None` for a gap.
    pub value: Option<i64>,
}
