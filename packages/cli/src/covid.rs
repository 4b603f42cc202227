//! The COVID-19 global time series report.

use chrono::Utc;
use data_reports_cli_utils::{IndicatifProgress, MultiProgress};
use data_reports_dataset::dataset_def::DatasetDefinition;
use data_reports_dataset::registry::dataset;
use data_reports_dataset::{DatasetError, FetchOptions};
use data_reports_epidemiology::load_observations;
use data_reports_epidemiology::views::{
    FilteredViews, country_series, daily_new, global_totals, last_reported, latest_by_country,
};
use data_reports_epidemiology_models::{Metric, SeriesPoint};
use data_reports_presenter::chart::{LinePoint, line_chart};
use data_reports_presenter::narrative::{attribution, heading, session_footer, wrap};
use data_reports_presenter::table::country_table;
use data_reports_presenter::{CHART_HEIGHT, CHART_WIDTH, TEXT_WIDTH, format_count, format_optional};

/// Country charted when none is given.
pub const DEFAULT_COUNTRY: &str = "US";

/// Rows in the latest-by-country table when no size is given.
pub const DEFAULT_TOP: usize = 10;

const INTRODUCTION: &str = "\
The Johns Hopkins University Center for Systems Science and Engineering \
published cumulative COVID-19 counts for every country from January 2020 \
until March 2023. Confirmed cases, deaths and recoveries come from three \
separate tables with one column per day. Provinces and states are summed \
into their country before the tables are joined, and a country or day \
missing from one table is shown as a gap rather than a zero.

Each worldwide chart is drawn from the rows where its own metric is \
positive, so a country enters the death chart on its first death and not \
on its first case.";

const RECOVERY_NOTE: &str = "\
Recoveries stopped being collected in August 2021. The recovery series \
is shown as published: it falls to zero for most countries at that point \
and is not interpolated or extended.";

const DAILY_NOTE: &str = "\
Daily new cases are the day-to-day difference of the cumulative series. \
Corrections in the source occasionally revise totals downward, which \
shows up as negative days.";

/// Options for one COVID-19 report run.
#[derive(Debug, Clone)]
pub struct CovidOptions {
    /// Location overriding the confirmed cases table.
    pub cases: Option<String>,
    /// Location overriding the deaths table.
    pub deaths: Option<String>,
    /// Location overriding the recoveries table.
    pub recovered: Option<String>,
    /// Country whose series is charted.
    pub country: String,
    /// Size of the latest-by-country table.
    pub top: usize,
    /// Maximum number of rows to load per table.
    pub limit: Option<u64>,
}

impl Default for CovidOptions {
    fn default() -> Self {
        Self {
            cases: None,
            deaths: None,
            recovered: None,
            country: DEFAULT_COUNTRY.to_string(),
            top: DEFAULT_TOP,
            limit: None,
        }
    }
}

impl CovidOptions {
    const fn location(&self, metric: Metric) -> Option<&String> {
        match metric {
            Metric::Cases => self.cases.as_ref(),
            Metric::Deaths => self.deaths.as_ref(),
            Metric::Recovered => self.recovered.as_ref(),
        }
    }
}

/// Resolves the dataset definition of every metric, applying any
/// location overrides.
fn sources(options: &CovidOptions) -> Result<Vec<(Metric, DatasetDefinition)>, DatasetError> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let mut definition = dataset(metric.dataset_id())?;
            if let Some(location) = options.location(metric) {
                definition = definition.with_locations(vec![location.clone()]);
            }
            Ok((metric, definition))
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn line_points(series: &[SeriesPoint]) -> Vec<LinePoint> {
    series
        .iter()
        .map(|p| LinePoint::new(p.date.format("%Y-%m-%d").to_string(), p.value.map(|v| v as f64)))
        .collect()
}

/// Loads the three time series and prints the report.
///
/// # Errors
///
/// Returns an error if a definition is missing or any table fails to
/// load, reshape or merge.
#[allow(clippy::future_not_send)]
pub async fn run(
    multi: &MultiProgress,
    options: &CovidOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = sources(options)?;

    let progress = IndicatifProgress::dataset_bar(multi, "Loading JHU CSSE time series");
    let observations = load_observations(
        &sources,
        &FetchOptions {
            limit: options.limit,
        },
        &progress,
    )
    .await?;

    print!("{}", heading("COVID-19 Worldwide"));
    print!("{}", wrap(INTRODUCTION, TEXT_WIDTH));
    println!();

    let views = FilteredViews::new(&observations);
    for &metric in Metric::ALL {
        let view = views.get(metric);
        log::debug!("{} view has {} rows", metric, view.len());
        let totals = global_totals(view, metric)?;
        print!(
            "{}",
            line_chart(
                &format!("Worldwide {}", metric.label().to_lowercase()),
                &line_points(&totals),
                CHART_HEIGHT,
                CHART_WIDTH
            )
        );
        if let Some(last) = last_reported(&totals) {
            println!(
                "  {} on {}: {}",
                metric.label(),
                last.date.format("%Y-%m-%d"),
                format_optional(last.value)
            );
        }
        println!();
    }
    print!("{}", wrap(RECOVERY_NOTE, TEXT_WIDTH));

    print!("{}", heading("Daily new cases"));
    let daily = daily_new(&global_totals(&observations, Metric::Cases)?);
    print!(
        "{}",
        line_chart(
            "Worldwide new confirmed cases per day",
            &line_points(&daily),
            CHART_HEIGHT,
            CHART_WIDTH
        )
    );
    if let Some(peak) = daily.iter().filter_map(|p| p.value.map(|v| (v, p.date))).max() {
        println!(
            "  Largest single day: {} on {}",
            format_count(peak.0),
            peak.1.format("%Y-%m-%d")
        );
    }
    println!();
    print!("{}", wrap(DAILY_NOTE, TEXT_WIDTH));

    print!("{}", heading(&options.country));
    let cases = country_series(&observations, &options.country, Metric::Cases);
    if cases.is_empty() {
        log::warn!("No observations for country '{}'", options.country);
        println!("No observations for {}.", options.country);
    } else {
        print!(
            "{}",
            line_chart(
                &format!("Confirmed cases in {}", options.country),
                &line_points(&cases),
                CHART_HEIGHT,
                CHART_WIDTH
            )
        );
        println!();
        print!(
            "{}",
            line_chart(
                &format!("New confirmed cases per day in {}", options.country),
                &line_points(&daily_new(&cases)),
                CHART_HEIGHT,
                CHART_WIDTH
            )
        );
        println!();
        for &metric in Metric::ALL {
            let series = country_series(&observations, &options.country, metric);
            match last_reported(&series) {
                Some(last) => println!(
                    "  {}: {} as of {}",
                    metric.label(),
                    format_optional(last.value),
                    last.date.format("%Y-%m-%d")
                ),
                None => println!("  {}: not reported", metric.label()),
            }
        }
    }

    print!("{}", heading("Latest totals by country"));
    print!("{}", country_table(&latest_by_country(&observations, options.top)));

    if let Some((_, definition)) = sources.first()
        && let Some(text) = &definition.license.attribution_text
    {
        println!();
        println!("{}", attribution(text, definition.portal_url.as_deref()));
    }
    println!(
        "{}",
        session_footer(
            env!("CARGO_BIN_NAME"),
            env!("CARGO_PKG_VERSION"),
            Utc::now()
        )
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn overrides_replace_only_their_metric() {
        let options = CovidOptions {
            deaths: Some("/tmp/deaths.csv".to_string()),
            ..CovidOptions::default()
        };
        let sources = sources(&options).unwrap();

        assert_eq!(sources.len(), 3);
        let (metric, deaths) = &sources[1];
        assert_eq!(*metric, Metric::Deaths);
        assert_eq!(deaths.fetcher.urls, vec!["/tmp/deaths.csv".to_string()]);
        assert!(sources[0].1.fetcher.urls[0].contains("confirmed_global"));
        assert!(sources[2].1.fetcher.urls[0].contains("recovered_global"));
    }

    #[test]
    fn series_gaps_become_chart_gaps() {
        let points = line_points(&[
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2021, 8, 4).unwrap(),
                value: Some(120),
            },
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2021, 8, 5).unwrap(),
                value: None,
            },
        ]);

        assert_eq!(points[0], LinePoint::new("2021-08-04", Some(120.0)));
        assert_eq!(points[1], LinePoint::new("2021-08-05", None));
    }
}
