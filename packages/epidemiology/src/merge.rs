//! Sum-merge aggregation of the three metric tables.
//!
//! Each long table is summed over Province/State into one value per
//! (country, date), the three sums are outer-joined, and only then are the
//! date headers parsed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use data_reports_dataset::DatasetError;
use data_reports_dataset_models::LongTable;
use data_reports_epidemiology_models::{EpidemiologyObservation, Metric};

use crate::EpidemiologyError;

/// Identifying column holding the country name.
pub const COUNTRY_COLUMN: &str = "Country/Region";

/// `(country, unparsed date header)`
pub type RawKey = (String, String);

/// Sums one metric's long table by (country, date).
///
/// A group whose every cell was missing sums to `None`.
///
/// # Errors
///
/// Returns [`EpidemiologyError::Dataset`] if the table has no
/// `Country/Region` key column or a sum overflows `i64`.
pub fn sum_by_country(
    long: &LongTable,
) -> Result<BTreeMap<RawKey, Option<i64>>, EpidemiologyError> {
    let country_idx =
        long.key_index(COUNTRY_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: COUNTRY_COLUMN.to_owned(),
            })?;

    let mut sums: BTreeMap<RawKey, Option<i64>> = BTreeMap::new();
    let mut skipped = 0_usize;

    for row in &long.rows {
        let Some(country) = row.keys.get(country_idx).and_then(Option::as_deref) else {
            skipped += 1;
            continue;
        };
        let sum = sums
            .entry((country.to_owned(), row.date.clone()))
            .or_insert(None);
        if let Some(value) = row.value {
            let total = sum
                .unwrap_or(0)
                .checked_add(value)
                .ok_or_else(|| DatasetError::Parse {
                    message: format!("sum for {country} on {} overflows", row.date),
                })?;
            *sum = Some(total);
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} rows without a {COUNTRY_COLUMN}");
    }

    Ok(sums)
}

/// Outer-joins per-metric sums on (country, date), parses the dates and
/// returns observations ordered by (country, date).
///
/// Keys missing from a metric's table leave that metric `None`.
///
/// # Errors
///
/// Returns [`EpidemiologyError::InvalidDate`] for an unparseable date
/// header and [`EpidemiologyError::DuplicateKey`] if two headers parse to
/// the same calendar date for one country.
pub fn outer_merge(
    sums: &BTreeMap<Metric, BTreeMap<RawKey, Option<i64>>>,
) -> Result<Vec<EpidemiologyObservation>, EpidemiologyError> {
    let mut merged: BTreeMap<&RawKey, BTreeMap<Metric, Option<i64>>> = BTreeMap::new();
    for (&metric, table) in sums {
        for (key, &value) in table {
            merged.entry(key).or_default().insert(metric, value);
        }
    }

    let mut observations: BTreeMap<(String, NaiveDate), EpidemiologyObservation> =
        BTreeMap::new();

    for ((country, raw_date), values) in merged {
        let date = parse_series_date(raw_date)?;
        let mut observation = EpidemiologyObservation {
            country: country.clone(),
            date,
            cases: None,
            deaths: None,
            recovered: None,
        };
        for (&metric, &value) in &values {
            observation.set(metric, value);
        }

        if observations
            .insert((country.clone(), date), observation)
            .is_some()
        {
            return Err(EpidemiologyError::DuplicateKey {
                country: country.clone(),
                date,
            });
        }
    }

    Ok(observations.into_values().collect())
}

/// Parses a time series header such as `"1/22/20"` (`M/D/YY`).
///
/// # Errors
///
/// Returns [`EpidemiologyError::InvalidDate`] if the header is not a date.
pub fn parse_series_date(s: &str) -> Result<NaiveDate, EpidemiologyError> {
    NaiveDate::parse_from_str(s, "%m/%d/%y").map_err(|_| EpidemiologyError::InvalidDate {
        value: s.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use data_reports_dataset_models::LongRow;

    use super::*;

    fn long(rows: &[(Option<&str>, &str, &str, Option<i64>)]) -> LongTable {
        LongTable {
            key_columns: vec!["Province/State".to_string(), COUNTRY_COLUMN.to_string()],
            rows: rows
                .iter()
                .map(|(province, country, date, value)| LongRow {
                    keys: vec![province.map(String::from), Some((*country).to_string())],
                    date: (*date).to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    fn key(country: &str, date: &str) -> RawKey {
        (country.to_string(), date.to_string())
    }

    #[test]
    fn sums_provinces_and_keeps_all_missing_groups_unset() {
        let sums = sum_by_country(&long(&[
            (Some("Hubei"), "China", "1/22/20", Some(444)),
            (Some("Beijing"), "China", "1/22/20", Some(14)),
            (Some("Anhui"), "China", "1/22/20", None),
            (None, "Italy", "1/22/20", None),
        ]))
        .unwrap();

        assert_eq!(sums[&key("China", "1/22/20")], Some(458));
        assert_eq!(sums[&key("Italy", "1/22/20")], None);
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        let err = sum_by_country(&long(&[
            (Some("A"), "X", "1/22/20", Some(i64::MAX)),
            (Some("B"), "X", "1/22/20", Some(1)),
        ]))
        .unwrap_err();

        match err {
            EpidemiologyError::Dataset(DatasetError::Parse { message }) => {
                assert!(message.contains("X on 1/22/20"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn summing_long_rows_matches_summing_wide_rows() {
        // Wide rows: [province, 1/22/20, 1/23/20]
        let wide = [("A", [3, 5]), ("B", [4, 7]), ("C", [0, 1])];
        let dates = ["1/22/20", "1/23/20"];
        let rows: Vec<_> = wide
            .iter()
            .flat_map(|(p, values)| {
                dates
                    .iter()
                    .zip(values)
                    .map(move |(d, v)| (Some(*p), "X", *d, Some(i64::from(*v))))
            })
            .collect();

        let sums = sum_by_country(&long(&rows)).unwrap();

        for (i, date) in dates.iter().enumerate() {
            let direct: i64 = wide.iter().map(|(_, v)| i64::from(v[i])).sum();
            assert_eq!(sums[&key("X", date)], Some(direct));
        }
    }

    #[test]
    fn key_in_one_table_only_leaves_other_metrics_unset() {
        let mut sums = BTreeMap::new();
        sums.insert(
            Metric::Cases,
            BTreeMap::from([(key("CountryA", "1/22/20"), Some(1))]),
        );
        sums.insert(Metric::Deaths, BTreeMap::new());
        sums.insert(Metric::Recovered, BTreeMap::new());

        let merged = outer_merge(&sums).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].country, "CountryA");
        assert_eq!(merged[0].date, NaiveDate::from_ymd_opt(2020, 1, 22).unwrap());
        assert_eq!(merged[0].cases, Some(1));
        assert_eq!(merged[0].deaths, None);
        assert_eq!(merged[0].recovered, None);
    }

    #[test]
    fn merged_rows_cover_every_key_ordered_by_country_and_date() {
        let mut sums = BTreeMap::new();
        sums.insert(
            Metric::Cases,
            BTreeMap::from([
                (key("B", "1/10/20"), Some(5)),
                (key("B", "1/9/20"), Some(4)),
            ]),
        );
        sums.insert(
            Metric::Deaths,
            BTreeMap::from([(key("A", "2/1/20"), Some(0))]),
        );
        sums.insert(
            Metric::Recovered,
            BTreeMap::from([(key("B", "1/9/20"), Some(1))]),
        );

        let merged = outer_merge(&sums).unwrap();
        let keys: Vec<(String, String)> = merged
            .iter()
            .map(|o| (o.country.clone(), o.date.to_string()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("A".to_string(), "2020-02-01".to_string()),
                ("B".to_string(), "2020-01-09".to_string()),
                ("B".to_string(), "2020-01-10".to_string()),
            ]
        );
        assert_eq!(merged[0].deaths, Some(0));
        assert_eq!(merged[0].cases, None);
        assert_eq!(merged[1].recovered, Some(1));
        assert_eq!(merged[2].recovered, None);
    }

    #[test]
    fn rejects_bad_date_headers() {
        assert!(matches!(
            parse_series_date("Lat"),
            Err(EpidemiologyError::InvalidDate { .. })
        ));
        assert_eq!(
            parse_series_date("12/31/21").unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()
        );
    }

    #[test]
    fn equivalent_headers_are_duplicate_keys() {
        let mut sums = BTreeMap::new();
        sums.insert(
            Metric::Cases,
            BTreeMap::from([
                (key("A", "1/22/20"), Some(1)),
                (key("A", "01/22/20"), Some(2)),
            ]),
        );
        assert!(matches!(
            outer_merge(&sums),
            Err(EpidemiologyError::DuplicateKey { .. })
        ));
    }
}
