//! Typing cleaned shooting rows as [`IncidentRecord`]s.

use std::str::FromStr as _;

use chrono::{NaiveDate, NaiveTime};
use data_reports_dataset_models::CleanTable;
use data_reports_incident_models::{Borough, IncidentRecord, PerpAgeGroup, PerpRace, PerpSex};

use crate::IncidentError;
use crate::columns::{
    BORO, LATITUDE, LONGITUDE, OCCUR_DATE, OCCUR_TIME, PERP_AGE_GROUP, PERP_RACE, PERP_SEX,
    STATISTICAL_MURDER_FLAG,
};

/// Positions of the columns a record is built from.
struct ColumnIndices {
    date: usize,
    time: usize,
    borough: usize,
    murder: usize,
    age: usize,
    sex: usize,
    race: usize,
    latitude: usize,
    longitude: usize,
}

impl ColumnIndices {
    fn resolve(clean: &CleanTable) -> Result<Self, IncidentError> {
        let find = |name: &str| {
            clean.table.column_index(name).ok_or_else(|| {
                IncidentError::Dataset(data_reports_dataset::DatasetError::MissingColumn {
                    column: name.to_owned(),
                })
            })
        };
        Ok(Self {
            date: find(OCCUR_DATE)?,
            time: find(OCCUR_TIME)?,
            borough: find(BORO)?,
            murder: find(STATISTICAL_MURDER_FLAG)?,
            age: find(PERP_AGE_GROUP)?,
            sex: find(PERP_SEX)?,
            race: find(PERP_RACE)?,
            latitude: find(LATITUDE)?,
            longitude: find(LONGITUDE)?,
        })
    }
}

/// Types every row of a cleaned shooting table.
///
/// Borough, murder flag, date and time are required. The perpetrator
/// columns must have been filled by the cleaner; codes outside the
/// published sets are kept verbatim. Coordinates that are missing,
/// unparseable or zero become `None`.
///
/// # Errors
///
/// Returns [`IncidentError::InvalidRecord`] for the first row that cannot be
/// typed and [`IncidentError::Dataset`] if a required column is absent.
pub fn incident_records(clean: &CleanTable) -> Result<Vec<IncidentRecord>, IncidentError> {
    let idx = ColumnIndices::resolve(clean)?;
    let table = &clean.table;

    (0..table.len())
        .map(|r| {
            let invalid = |message: String| IncidentError::InvalidRecord {
                row: r + 1,
                message,
            };
            let required = |col: usize, name: &str| {
                table
                    .value(r, col)
                    .ok_or_else(|| invalid(format!("{name} is missing")))
            };

            let date = required(idx.date, OCCUR_DATE)?;
            let occurred_on = parse_occur_date(date)
                .ok_or_else(|| invalid(format!("unparseable {OCCUR_DATE} '{date}'")))?;

            let time = required(idx.time, OCCUR_TIME)?;
            let occurred_at = parse_occur_time(time)
                .ok_or_else(|| invalid(format!("unparseable {OCCUR_TIME} '{time}'")))?;

            let boro = required(idx.borough, BORO)?;
            let borough = Borough::from_str(boro)
                .map_err(|_| invalid(format!("unknown borough '{boro}'")))?;

            let flag = required(idx.murder, STATISTICAL_MURDER_FLAG)?;
            let murder = parse_murder_flag(flag)
                .ok_or_else(|| invalid(format!("unrecognized murder flag '{flag}'")))?;

            let perp_age_group = required(idx.age, PERP_AGE_GROUP).map(|v| {
                PerpAgeGroup::from_str(v).unwrap_or_else(|_| PerpAgeGroup::Other(v.to_owned()))
            })?;
            let perp_sex = required(idx.sex, PERP_SEX).map(|v| {
                PerpSex::from_str(v).unwrap_or_else(|_| PerpSex::Other(v.to_owned()))
            })?;
            let perp_race = required(idx.race, PERP_RACE).map(|v| {
                PerpRace::from_str(v).unwrap_or_else(|_| PerpRace::Other(v.to_owned()))
            })?;

            let (latitude, longitude) =
                parse_lat_lng(table.value(r, idx.latitude), table.value(r, idx.longitude))
                    .unzip();

            Ok(IncidentRecord {
                occurred_on,
                occurred_at,
                borough,
                murder,
                perp_age_group,
                perp_sex,
                perp_race,
                latitude,
                longitude,
            })
        })
        .collect()
}

/// Parses an `OCCUR_DATE` value (`MM/DD/YYYY`).
#[must_use]
pub fn parse_occur_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

/// Parses an `OCCUR_TIME` value (`HH:MM:SS`, seconds optional).
#[must_use]
pub fn parse_occur_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parses the murder flag. The dataset has published both `true`/`false`
/// and `Y`/`N` over the years.
#[must_use]
pub fn parse_murder_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "y" | "yes" | "1" => Some(true),
        "false" | "n" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a coordinate pair. Returns `None` if either side is missing,
/// unparseable, or zero.
fn parse_lat_lng(lat: Option<&str>, lng: Option<&str>) -> Option<(f64, f64)> {
    let latitude = lat?.parse::<f64>().ok()?;
    let longitude = lng?.parse::<f64>().ok()?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    Some((latitude, longitude))
}

#[cfg(test)]
mod tests {
    use chrono::Timelike as _;
    use data_reports_dataset_models::Table;
    use data_reports_incident_models::Weekday;

    use super::*;

    const COLUMNS: [&str; 9] = [
        OCCUR_DATE,
        OCCUR_TIME,
        BORO,
        STATISTICAL_MURDER_FLAG,
        PERP_AGE_GROUP,
        PERP_SEX,
        PERP_RACE,
        LATITUDE,
        LONGITUDE,
    ];

    fn clean(rows: &[[&str; 9]]) -> CleanTable {
        let mut table = Table::new(COLUMNS.iter().map(ToString::to_string).collect());
        for row in rows {
            table.push_row(
                row.iter()
                    .map(|c| (!c.is_empty()).then(|| (*c).to_string()))
                    .collect(),
            );
        }
        CleanTable { table }
    }

    #[test]
    fn types_a_complete_row() {
        let records = incident_records(&clean(&[[
            "01/14/2024",
            "21:45:00",
            "STATEN ISLAND",
            "true",
            "18-24",
            "M",
            "BLACK",
            "40.63",
            "-74.08",
        ]]))
        .unwrap();

        let record = &records[0];
        assert_eq!(record.borough, Borough::StatenIsland);
        assert!(record.murder);
        assert_eq!(record.weekday(), Weekday::Sunday);
        assert_eq!(record.hour(), 21);
        assert_eq!(record.occurred_at.minute(), 45);
        assert_eq!(record.perp_age_group, PerpAgeGroup::From18To24);
        assert_eq!(record.latitude, Some(40.63));
        assert_eq!(record.longitude, Some(-74.08));
    }

    #[test]
    fn missing_or_zero_coordinates_are_none() {
        let records = incident_records(&clean(&[
            [
                "01/14/2024", "21:45:00", "BRONX", "false", "UNKNOWN", "U", "UNKNOWN", "", "",
            ],
            [
                "01/14/2024", "21:45:00", "BRONX", "false", "UNKNOWN", "U", "UNKNOWN", "0.0",
                "-73.9",
            ],
        ]))
        .unwrap();

        assert!(records.iter().all(|r| r.latitude.is_none() && r.longitude.is_none()));
    }

    #[test]
    fn unrecognized_codes_pass_through() {
        let records = incident_records(&clean(&[[
            "01/14/2024", "21:45:00", "BRONX", "false", "(null)", "X", "OTHER", "", "",
        ]]))
        .unwrap();

        assert_eq!(records[0].perp_age_group.as_str(), "(null)");
        assert_eq!(records[0].perp_sex, PerpSex::Other("X".to_string()));
        assert_eq!(records[0].perp_race.as_str(), "OTHER");
    }

    #[test]
    fn missing_borough_is_an_error() {
        let err = incident_records(&clean(&[
            [
                "01/14/2024", "21:45:00", "BRONX", "false", "UNKNOWN", "U", "UNKNOWN", "", "",
            ],
            [
                "01/14/2024", "21:45:00", "", "false", "UNKNOWN", "U", "UNKNOWN", "", "",
            ],
        ]))
        .unwrap_err();

        assert!(matches!(err, IncidentError::InvalidRecord { row: 2, .. }));
    }

    #[test]
    fn bad_date_is_an_error() {
        let err = incident_records(&clean(&[[
            "2024-01-14", "21:45:00", "BRONX", "false", "UNKNOWN", "U", "UNKNOWN", "", "",
        ]]))
        .unwrap_err();

        assert!(matches!(err, IncidentError::InvalidRecord { row: 1, .. }));
    }

    #[test]
    fn murder_flag_variants() {
        assert_eq!(parse_murder_flag("TRUE"), Some(true));
        assert_eq!(parse_murder_flag("Y"), Some(true));
        assert_eq!(parse_murder_flag("false"), Some(false));
        assert_eq!(parse_murder_flag("N"), Some(false));
        assert_eq!(parse_murder_flag("maybe"), None);
    }

    #[test]
    fn time_without_seconds() {
        assert_eq!(parse_occur_time("07:05").unwrap().hour(), 7);
        assert!(parse_occur_time("25:00:00").is_none());
    }
}
