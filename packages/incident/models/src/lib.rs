#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shooting incident record types and categorical domains.
//!
//! The borough set and the weekday order are declared here as enumerations
//! with an explicit `ALL` ordering. Aggregations iterate these constants
//! rather than sorting whatever labels happen to appear in the data.

use chrono::{Datelike as _, NaiveDate, NaiveTime, Timelike as _};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the five boroughs of New York City.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum Borough {
    /// The Bronx
    #[strum(serialize = "BRONX")]
    Bronx,
    /// Brooklyn (Kings County)
    #[strum(serialize = "BROOKLYN")]
    Brooklyn,
    /// Manhattan (New York County)
    #[strum(serialize = "MANHATTAN")]
    Manhattan,
    /// Queens
    #[strum(serialize = "QUEENS")]
    Queens,
    /// Staten Island (Richmond County)
    #[strum(serialize = "STATEN ISLAND")]
    StatenIsland,
}

impl Borough {
    /// Every borough, in report order.
    pub const ALL: &[Self] = &[
        Self::Bronx,
        Self::Brooklyn,
        Self::Manhattan,
        Self::Queens,
        Self::StatenIsland,
    ];

    /// Title-case name for charts and tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bronx => "Bronx",
            Self::Brooklyn => "Brooklyn",
            Self::Manhattan => "Manhattan",
            Self::Queens => "Queens",
            Self::StatenIsland => "Staten Island",
        }
    }
}

/// Day of the week, numbered 1 (Sunday) through 7 (Saturday).
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
pub enum Weekday {
    /// Day 1
    Sunday = 1,
    /// Day 2
    Monday = 2,
    /// Day 3
    Tuesday = 3,
    /// Day 4
    Wednesday = 4,
    /// Day 5
    Thursday = 5,
    /// Day 6
    Friday = 6,
    /// Day 7
    Saturday = 7,
}

impl Weekday {
    /// Every weekday in calendar order, Sunday first.
    pub const ALL: &[Self] = &[
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// The weekday of a calendar date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[date.weekday().num_days_from_sunday() as usize]
    }

    /// Day number, 1 (Sunday) through 7 (Saturday).
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

/// Perpetrator age group as published by the NYPD.
///
/// Values outside the published set are kept verbatim in
/// [`PerpAgeGroup::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum PerpAgeGroup {
    /// Under 18
    #[strum(serialize = "<18")]
    Under18,
    /// 18 to 24
    #[strum(serialize = "18-24")]
    From18To24,
    /// 25 to 44
    #[strum(serialize = "25-44")]
    From25To44,
    /// 45 to 64
    #[strum(serialize = "45-64")]
    From45To64,
    /// 65 and over
    #[strum(serialize = "65+")]
    Over64,
    /// Not recorded
    #[strum(serialize = "UNKNOWN")]
    Unknown,
    /// Unrecognized code
    #[strum(default)]
    Other(String),
}

impl PerpAgeGroup {
    /// The label as it appears in the dataset.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Under18 => "<18",
            Self::From18To24 => "18-24",
            Self::From25To44 => "25-44",
            Self::From45To64 => "45-64",
            Self::Over64 => "65+",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }
}

/// Perpetrator sex as published by the NYPD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum PerpSex {
    /// Female
    #[strum(serialize = "F")]
    Female,
    /// Male
    #[strum(serialize = "M")]
    Male,
    /// Not recorded
    #[strum(serialize = "U")]
    Unknown,
    /// Unrecognized code
    #[strum(default)]
    Other(String),
}

impl PerpSex {
    /// The label as it appears in the dataset.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Female => "F",
            Self::Male => "M",
            Self::Unknown => "U",
            Self::Other(s) => s,
        }
    }
}

/// Perpetrator race as published by the NYPD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum PerpRace {
    #[strum(serialize = "AMERICAN INDIAN/ALASKAN NATIVE")]
    AmericanIndianAlaskanNative,
    #[strum(serialize = "ASIAN / PACIFIC ISLANDER")]
    AsianPacificIslander,
    #[strum(serialize = "BLACK")]
    Black,
    #[strum(serialize = "BLACK HISPANIC")]
    BlackHispanic,
    #[strum(serialize = "WHITE")]
    White,
    #[strum(serialize = "WHITE HISPANIC")]
    WhiteHispanic,
    /// Not recorded
    #[strum(serialize = "UNKNOWN")]
    Unknown,
    /// Unrecognized code
    #[strum(default)]
    Other(String),
}

impl PerpRace {
    /// The label as it appears in the dataset.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AmericanIndianAlaskanNative => "AMERICAN INDIAN/ALASKAN NATIVE",
            Self::AsianPacificIslander => "ASIAN / PACIFIC ISLANDER",
            Self::Black => "BLACK",
            Self::BlackHispanic => "BLACK HISPANIC",
            Self::White => "WHITE",
            Self::WhiteHispanic => "WHITE HISPANIC",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }
}

/// One shooting incident after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    /// Date of occurrence.
    pub occurred_on: NaiveDate,
    /// Time of occurrence.
    pub occurred_at: NaiveTime,
    /// Borough of occurrence.
    pub borough: Borough,
    /// Whether the shooting resulted in a death counted as a murder.
    pub murder: bool,
    /// Perpetrator age group.
    pub perp_age_group: PerpAgeGroup,
    /// Perpetrator sex.
    pub perp_sex: PerpSex,
    /// Perpetrator race.
    pub perp_race: PerpRace,
    /// Latitude (WGS84), when published.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), when published.
    pub longitude: Option<f64>,
}

impl IncidentRecord {
    /// Day of the week the incident occurred on.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        Weekday::of(self.occurred_on)
    }

    /// Hour of day, 0–23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.occurred_at.hour()
    }

    /// Calendar year of occurrence.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.occurred_on.year()
    }
}

/// Number of records in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount<K> {
    /// The group label.
    pub group: K,
    /// Records in the group.
    pub count: u64,
}

/// Murder / non-murder split for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MurderShare<K> {
    /// The group label.
    pub group: K,
    /// Incidents flagged as murders.
    pub murders: u64,
    /// Incidents not flagged as murders.
    pub non_murders: u64,
}

impl<K> MurderShare<K> {
    /// Total incidents in the group.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.murders + self.non_murders
    }

    /// Percentage of incidents that were murders: `100 × murders / total`.
    /// `None` for an empty group.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| 100.0 * self.murders as f64 / total as f64)
    }
}
