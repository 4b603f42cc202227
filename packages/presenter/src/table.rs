//! Summary tables rendered with `tabled`.

use data_reports_epidemiology_models::EpidemiologyObservation;
use data_reports_incident_models::{GroupCount, MurderShare};
use data_reports_stats::logistic::LogisticFit;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::{format_count, format_optional};

/// Smallest p-value shown as a number; anything below prints as `<2e-16`.
const P_VALUE_FLOOR: f64 = 2e-16;

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn count_string(count: u64) -> String {
    i64::try_from(count).map_or_else(|_| count.to_string(), format_count)
}

#[derive(Debug, Tabled)]
struct CountRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Incidents")]
    count: String,
}

/// One row per group with its count, labelled by `label`.
#[must_use]
pub fn count_table<K>(counts: &[GroupCount<K>], label: impl Fn(&K) -> String) -> String {
    render(
        counts
            .iter()
            .map(|c| CountRow {
                group: label(&c.group),
                count: count_string(c.count),
            })
            .collect(),
    )
}

#[derive(Debug, Tabled)]
struct MurderShareRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Murders")]
    murders: String,
    #[tabled(rename = "Non-murders")]
    non_murders: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Murder %")]
    percent: String,
}

/// Murder cross-tab with the percentage of incidents that were murders.
///
/// `label` renders a group; an empty group shows `-` for its percentage.
#[must_use]
pub fn murder_share_table<K>(shares: &[MurderShare<K>], label: impl Fn(&K) -> String) -> String {
    render(
        shares
            .iter()
            .map(|s| MurderShareRow {
                group: label(&s.group),
                murders: count_string(s.murders),
                non_murders: count_string(s.non_murders),
                total: count_string(s.total()),
                percent: s
                    .percent()
                    .map_or_else(|| "-".to_string(), |p| format!("{p:.2}")),
            })
            .collect(),
    )
}

#[derive(Debug, Tabled)]
struct CoefficientRow {
    #[tabled(rename = "Term")]
    term: String,
    #[tabled(rename = "Estimate")]
    estimate: String,
    #[tabled(rename = "Std. Error")]
    std_error: String,
    #[tabled(rename = "z value")]
    z_value: String,
    #[tabled(rename = "Pr(>|z|)")]
    p_value: String,
}

/// Formats a p-value the way statistics packages print them.
#[must_use]
pub fn format_p_value(p: f64) -> String {
    if p < P_VALUE_FLOOR {
        format!("<{P_VALUE_FLOOR:e}")
    } else if p < 1e-4 {
        format!("{p:.2e}")
    } else {
        format!("{p:.4}")
    }
}

/// Coefficient table of a logistic fit, followed by its deviance summary.
#[must_use]
pub fn coefficient_table(fit: &LogisticFit) -> String {
    let table = render(
        fit.coefficients
            .iter()
            .map(|c| CoefficientRow {
                term: c.name.clone(),
                estimate: format!("{:.6}", c.estimate),
                std_error: format!("{:.6}", c.std_error),
                z_value: format!("{:.3}", c.z_value),
                p_value: format_p_value(c.p_value),
            })
            .collect(),
    );
    let residual_df = fit.observations.saturating_sub(fit.coefficients.len());
    format!(
        "{table}\n\
         Null deviance: {:.1} on {} degrees of freedom\n\
         Residual deviance: {:.1} on {residual_df} degrees of freedom\n\
         AIC: {:.1}    Fisher scoring iterations: {}\n",
        fit.null_deviance,
        fit.observations.saturating_sub(1),
        fit.residual_deviance,
        fit.aic,
        fit.iterations
    )
}

#[derive(Debug, Tabled)]
struct CountryRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Country/Region")]
    country: String,
    #[tabled(rename = "As of")]
    date: String,
    #[tabled(rename = "Cases")]
    cases: String,
    #[tabled(rename = "Deaths")]
    deaths: String,
    #[tabled(rename = "Recovered")]
    recovered: String,
}

/// Ranked latest-observation table; gaps print as `-`.
#[must_use]
pub fn country_table(observations: &[EpidemiologyObservation]) -> String {
    render(
        observations
            .iter()
            .enumerate()
            .map(|(i, o)| CountryRow {
                rank: i + 1,
                country: o.country.clone(),
                date: o.date.format("%Y-%m-%d").to_string(),
                cases: format_optional(o.cases),
                deaths: format_optional(o.deaths),
                recovered: format_optional(o.recovered),
            })
            .collect(),
    )
}
