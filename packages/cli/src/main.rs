#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the NYPD shooting and COVID-19 reports.
//!
//! Each subcommand loads its datasets, prints the report to stdout and
//! exits. Without a subcommand the user picks a report interactively.
//!
//! Uses `indicatif-log-bridge` (via [`data_reports_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod covid;
mod interactive;
mod shooting;

use clap::{Parser, Subcommand};
use covid::{CovidOptions, DEFAULT_COUNTRY, DEFAULT_TOP};
use data_reports_dataset::registry::all_datasets;
use shooting::ShootingOptions;

#[derive(Parser)]
#[command(name = "data_reports", about = "Public dataset reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report on NYPD shooting incidents
    Shooting {
        /// Local path or URL of the incident CSV (overrides the configured download)
        #[arg(long)]
        input: Option<String>,
        /// Maximum number of records to load (for testing)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },
    /// Report on the JHU CSSE COVID-19 global time series
    Covid {
        /// Local path or URL of the confirmed cases CSV
        #[arg(long)]
        cases: Option<String>,
        /// Local path or URL of the deaths CSV
        #[arg(long)]
        deaths: Option<String>,
        /// Local path or URL of the recoveries CSV
        #[arg(long)]
        recovered: Option<String>,
        /// Country whose series is charted (e.g., "Germany")
        #[arg(long, default_value = DEFAULT_COUNTRY)]
        country: String,
        /// Number of countries in the latest totals table
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
        /// Maximum number of rows to load per table (for testing)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },
    /// List all configured datasets
    Datasets,
}

fn list_datasets() {
    println!("{:<20} NAME", "ID");
    println!("{}", "-".repeat(50));
    for definition in all_datasets() {
        println!("{:<20} {}", definition.id, definition.name);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = data_reports_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi).await;
    };

    match command {
        Commands::Shooting { input, limit } => {
            shooting::run(&multi, &ShootingOptions { input, limit }).await?;
        }
        Commands::Covid {
            cases,
            deaths,
            recovered,
            country,
            top,
            limit,
        } => {
            let options = CovidOptions {
                cases,
                deaths,
                recovered,
                country,
                top,
                limit,
            };
            covid::run(&multi, &options).await?;
        }
        Commands::Datasets => list_datasets(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn covid_defaults() {
        let cli = Cli::try_parse_from(["data_reports", "covid", "--deaths", "d.csv"]).unwrap();
        let Some(Commands::Covid {
            deaths,
            country,
            top,
            cases,
            ..
        }) = cli.command
        else {
            panic!("expected the covid subcommand");
        };
        assert_eq!(deaths.as_deref(), Some("d.csv"));
        assert_eq!(cases, None);
        assert_eq!(country, "US");
        assert_eq!(top, 10);
    }

    #[test]
    fn shooting_flags() {
        let cli = Cli::try_parse_from([
            "data_reports",
            "shooting",
            "--input",
            "shootings.csv",
            "--limit",
            "500",
        ])
        .unwrap();
        let Some(Commands::Shooting { input, limit }) = cli.command else {
            panic!("expected the shooting subcommand");
        };
        assert_eq!(input.as_deref(), Some("shootings.csv"));
        assert_eq!(limit, Some(500));
    }

    #[test]
    fn zero_limit_is_rejected() {
        for command in ["shooting", "covid"] {
            let result = Cli::try_parse_from(["data_reports", command, "--limit", "0"]);
            assert!(result.is_err(), "{command} accepted --limit 0");
        }
    }
}
