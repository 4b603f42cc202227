//! The NYPD shooting incident report.

use chrono::Utc;
use data_reports_cli_utils::{IndicatifProgress, MultiProgress};
use data_reports_dataset::FetchOptions;
use data_reports_dataset::registry::dataset;
use data_reports_incident::aggregate::{
    count_by_borough, count_by_hour, count_by_weekday, count_by_year, murder_share_by_borough,
    murder_share_by_weekday,
};
use data_reports_incident::load_incidents;
use data_reports_incident::model::fit_murder_model;
use data_reports_incident_models::Weekday;
use data_reports_presenter::chart::{Bar, LinePoint, bar_chart, line_chart};
use data_reports_presenter::narrative::{attribution, heading, session_footer, wrap};
use data_reports_presenter::table::{coefficient_table, count_table, murder_share_table};
use data_reports_presenter::{CHART_HEIGHT, CHART_WIDTH, TEXT_WIDTH, format_count};

/// Id of the shooting dataset definition.
pub const DATASET_ID: &str = "nypd_shooting";

const INTRODUCTION: &str = "\
This report summarizes every shooting incident recorded by the New York City \
Police Department since 2006. Each record describes one shooting: where and \
when it happened, whether the victim died and the incident was classified as \
a murder, and what is known about the perpetrator.

Perpetrator details are frequently missing. Missing age group, sex and race \
values are reported as UNKNOWN (or U for sex), and a handful of malformed age \
group codes are folded into UNKNOWN as well. Borough, the murder flag and the \
coordinates are left as published.";

const BOROUGH_NOTE: &str = "\
Brooklyn and the Bronx account for the majority of shootings. The share of \
shootings that end in a murder is far more even across boroughs, so where a \
shooting happens says much more about how many there are than about how \
deadly each one is.";

const TIME_NOTE: &str = "\
Shootings cluster on weekends and late at night, peaking in the hours around \
midnight and bottoming out in the morning.";

const MODEL_NOTE: &str = "\
The model below estimates the log-odds that a shooting is classified as a \
murder. Categorical predictors are compared against their reference level. \
Rows without coordinates are excluded. Coefficients with a p-value under 0.05 \
are conventionally read as significant.";

/// Options for one shooting report run.
#[derive(Debug, Clone, Default)]
pub struct ShootingOptions {
    /// Local path or URL overriding the configured download location.
    pub input: Option<String>,
    /// Maximum number of records to load.
    pub limit: Option<u64>,
}

/// Loads the shooting dataset and prints the report.
///
/// # Errors
///
/// Returns an error if loading, cleaning, typing or model fitting fails.
#[allow(clippy::future_not_send)]
pub async fn run(
    multi: &MultiProgress,
    options: &ShootingOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut definition = dataset(DATASET_ID)?;
    if let Some(input) = &options.input {
        definition = definition.with_locations(vec![input.clone()]);
    }

    let progress = IndicatifProgress::dataset_bar(multi, &format!("Loading {}", definition.name));
    let incidents = load_incidents(
        &definition,
        &FetchOptions {
            limit: options.limit,
        },
        &progress,
    )
    .await?;
    let records = &incidents.records;

    print!("{}", heading("NYPD Shooting Incidents"));
    print!("{}", wrap(INTRODUCTION, TEXT_WIDTH));
    println!();
    println!(
        "Incidents analysed: {}",
        format_count(i64::try_from(records.len()).unwrap_or(i64::MAX))
    );
    for (column, count) in &incidents.report.filled {
        println!("  {column}: {count} missing values filled");
    }
    for (column, count) in &incidents.report.substituted {
        println!("  {column}: {count} invalid codes replaced");
    }
    for (column, values) in &incidents.report.unrecognized {
        println!("  {column}: unrecognized values kept: {}", values.join(", "));
    }

    print!("{}", heading("Where"));
    let boroughs = count_by_borough(records);
    let bars: Vec<Bar> = boroughs
        .iter()
        .map(|c| Bar::count(c.group.label(), c.count))
        .collect();
    print!("{}", bar_chart("Shootings by borough", &bars, CHART_WIDTH));
    println!();
    print!("{}", count_table(&boroughs, |b| b.label().to_string()));
    println!();
    print!(
        "{}",
        murder_share_table(&murder_share_by_borough(records), |b| b.label().to_string())
    );
    println!();
    print!("{}", wrap(BOROUGH_NOTE, TEXT_WIDTH));

    print!("{}", heading("When"));
    let weekdays = count_by_weekday(records);
    let bars: Vec<Bar> = weekdays
        .iter()
        .map(|c| Bar::count(c.group.to_string(), c.count))
        .collect();
    print!("{}", bar_chart("Shootings by day of week", &bars, CHART_WIDTH));
    println!();
    print!("{}", count_table(&weekdays, Weekday::to_string));
    println!();
    print!(
        "{}",
        murder_share_table(&murder_share_by_weekday(records), Weekday::to_string)
    );
    println!();

    let hours = count_by_hour(records);
    let hour_label = |hour: &u32| format!("{hour:02}:00");
    let bars: Vec<Bar> = hours
        .iter()
        .map(|c| Bar::count(hour_label(&c.group), c.count))
        .collect();
    print!("{}", bar_chart("Shootings by hour of day", &bars, CHART_WIDTH));
    println!();
    print!("{}", count_table(&hours, hour_label));
    println!();

    #[allow(clippy::cast_precision_loss)]
    let points: Vec<LinePoint> = count_by_year(records)
        .iter()
        .map(|c| LinePoint::new(c.group.to_string(), Some(c.count as f64)))
        .collect();
    print!(
        "{}",
        line_chart("Shootings per year", &points, CHART_HEIGHT, CHART_WIDTH)
    );
    println!();
    print!("{}", wrap(TIME_NOTE, TEXT_WIDTH));

    print!("{}", heading("Which shootings become murders"));
    print!("{}", wrap(MODEL_NOTE, TEXT_WIDTH));
    println!();
    let model = fit_murder_model(records)?;
    for (predictor, level) in &model.references {
        println!("  Reference level for {predictor}: {level}");
    }
    if model.dropped > 0 {
        println!("  Records without coordinates excluded: {}", model.dropped);
    }
    println!();
    print!("{}", coefficient_table(&model.fit));

    if let Some(text) = &definition.license.attribution_text {
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
