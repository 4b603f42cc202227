//! Count aggregation and murder cross-tabulation.
//!
//! Group order always comes from the domain's declared order ([`Borough::ALL`],
//! [`Weekday::ALL`], hours 0–23), so groups with no incidents still appear
//! with a zero count.

use std::collections::BTreeMap;

use data_reports_incident_models::{Borough, GroupCount, IncidentRecord, MurderShare, Weekday};

/// Counts records per key, emitting one entry for every key in `order`.
fn count_by<K, F>(records: &[IncidentRecord], order: &[K], key: F) -> Vec<GroupCount<K>>
where
    K: Copy + Ord,
    F: Fn(&IncidentRecord) -> K,
{
    let mut counts: BTreeMap<K, u64> = order.iter().map(|&k| (k, 0)).collect();
    for record in records {
        if let Some(count) = counts.get_mut(&key(record)) {
            *count += 1;
        }
    }
    order
        .iter()
        .map(|&group| GroupCount {
            group,
            count: counts[&group],
        })
        .collect()
}

/// Incidents per borough, in [`Borough::ALL`] order.
#[must_use]
pub fn count_by_borough(records: &[IncidentRecord]) -> Vec<GroupCount<Borough>> {
    count_by(records, Borough::ALL, |r| r.borough)
}

/// Incidents per weekday, Sunday first.
#[must_use]
pub fn count_by_weekday(records: &[IncidentRecord]) -> Vec<GroupCount<Weekday>> {
    count_by(records, Weekday::ALL, IncidentRecord::weekday)
}

/// Incidents per hour of day; all 24 hours are present.
#[must_use]
pub fn count_by_hour(records: &[IncidentRecord]) -> Vec<GroupCount<u32>> {
    let hours: Vec<u32> = (0..24).collect();
    count_by(records, &hours, IncidentRecord::hour)
}

/// Incidents per calendar year, ascending. Only observed years appear.
#[must_use]
pub fn count_by_year(records: &[IncidentRecord]) -> Vec<GroupCount<i32>> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.year()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(group, count)| GroupCount { group, count })
        .collect()
}

/// Murder / non-murder split per borough, in [`Borough::ALL`] order.
#[must_use]
pub fn murder_share_by_borough(records: &[IncidentRecord]) -> Vec<MurderShare<Borough>> {
    murder_share_by(records, Borough::ALL, |r| r.borough)
}

/// Murder / non-murder split per weekday, Sunday first.
#[must_use]
pub fn murder_share_by_weekday(records: &[IncidentRecord]) -> Vec<MurderShare<Weekday>> {
    murder_share_by(records, Weekday::ALL, IncidentRecord::weekday)
}

fn murder_share_by<K, F>(records: &[IncidentRecord], order: &[K], key: F) -> Vec<MurderShare<K>>
where
    K: Copy + Ord,
    F: Fn(&IncidentRecord) -> K,
{
    let mut tallies: BTreeMap<K, (u64, u64)> = order.iter().map(|&k| (k, (0, 0))).collect();
    for record in records {
        if let Some((murders, non_murders)) = tallies.get_mut(&key(record)) {
            if record.murder {
                *murders += 1;
            } else {
                *non_murders += 1;
            }
        }
    }
    order
        .iter()
        .map(|&group| {
            let (murders, non_murders) = tallies[&group];
            MurderShare {
                group,
                murders,
                non_murders,
            }
        })
        .collect()
}
