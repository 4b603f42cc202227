//! Menu-driven report selection using `dialoguer`, for running the
//! reports without memorizing CLI flags.

use data_reports_cli_utils::MultiProgress;
use dialoguer::{Input, Select};

use crate::covid::{self, CovidOptions, DEFAULT_COUNTRY, DEFAULT_TOP};
use crate::shooting::{self, ShootingOptions};

/// Top-level actions available in the interactive menu.
enum Action {
    Shooting,
    Covid,
    ListDatasets,
}

impl Action {
    const ALL: &[Self] = &[Self::Shooting, Self::Covid, Self::ListDatasets];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Shooting => "NYPD shooting incident report",
            Self::Covid => "COVID-19 worldwide report",
            Self::ListDatasets => "List datasets",
        }
    }
}

/// Prompts for a report, then for its options, and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected report fails.
#[allow(clippy::future_not_send)]
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("Which report would you like?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Shooting => {
            let limit = prompt_optional_u64("Record limit (empty for no limit)")?;
            shooting::run(multi, &ShootingOptions { input: None, limit }).await?;
        }
        Action::Covid => {
            let country: String = Input::new()
                .with_prompt("Country to chart")
                .default(DEFAULT_COUNTRY.to_string())
                .interact_text()?;
            let top: usize = Input::new()
                .with_prompt("Countries in the latest totals table")
                .default(DEFAULT_TOP)
                .interact_text()?;
            let limit = prompt_optional_u64("Row limit per table (empty for no limit)")?;
            let options = CovidOptions {
                country,
                top,
                limit,
                ..CovidOptions::default()
            };
            covid::run(multi, &options).await?;
        }
        Action::ListDatasets => crate::list_datasets(),
    }

    Ok(())
}

/// Prompts for an optional positive limit. Returns `None` if the input is
/// empty.
fn prompt_optional_u64(prompt: &str) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(parse_limit(&input)?)
}

/// Parses a record limit. Empty input means no limit; zero is rejected.
fn parse_limit(input: &str) -> Result<Option<u64>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u64>() {
        Ok(0) => Err("the limit must be at least 1".to_string()),
        Ok(limit) => Ok(Some(limit)),
        Err(e) => Err(format!("'{input}' is not a record count: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_must_be_positive() {
        assert_eq!(parse_limit(""), Ok(None));
        assert_eq!(parse_limit(" 250 "), Ok(Some(250)));
        assert!(parse_limit("0").is_err());
        assert!(parse_limit("-3").is_err());
    }
}
