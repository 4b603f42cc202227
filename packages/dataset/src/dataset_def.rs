//! Config-driven dataset definition.
//!
//! [`DatasetDefinition`] captures everything a report needs to know about a
//! public CSV: where to download it, which columns to keep, how to repair
//! its categorical columns, and (for wide time series) how to melt it. The
//! definitions are TOML files embedded at compile time by [`crate::registry`].

use serde::Deserialize;

use crate::cleaner::CleaningPlan;
use crate::reshape::ReshapeSpec;

// ── Top-level dataset definition ─────────────────────────────────────────

/// A complete, config-driven dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"nypd_shooting"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable portal page for the dataset, if any.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// Licensing and attribution metadata.
    pub license: LicenseInfo,
    /// Where and how to download the CSV.
    pub fetcher: FetcherConfig,
    /// Column selection, fill values, substitutions and domains.
    #[serde(default)]
    pub cleaning: CleaningPlan,
    /// Wide-to-long reshape parameters, for per-date column layouts.
    #[serde(default)]
    pub reshape: Option<ReshapeSpec>,
}

impl DatasetDefinition {
    /// Replaces the configured download locations (e.g. with a local copy
    /// given on the command line).
    #[must_use]
    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.fetcher.urls = locations;
        self
    }
}

// ── License metadata ─────────────────────────────────────────────────────

/// Licensing terms of a public dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseInfo {
    /// License type identifier (e.g., `"open_data"`, `"cc_by"`).
    pub license_type: String,
    /// URL to the terms of use, if available.
    #[serde(default)]
    pub tos_url: Option<String>,
    /// Verbatim attribution text printed with the report.
    #[serde(default)]
    pub attribution_text: Option<String>,
}

// ── Fetcher config ───────────────────────────────────────────────────────

/// How to fetch the raw CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// URLs or local paths of the CSV files. Multiple files are
    /// concatenated and must share one header.
    pub urls: Vec<String>,
    /// Field delimiter (default: comma).
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Compression format: `"gzip"` or omit for uncompressed.
    #[serde(default)]
    pub compressed: Option<String>,
    /// Maximum records per file.
    #[serde(default)]
    pub max_records: Option<u64>,
}

/// Parses a TOML string into a [`DatasetDefinition`].
///
/// # Errors
///
/// Returns an error string if the TOML is malformed or missing required
/// fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_definition() {
        let def = parse_dataset_toml(
            r#"
            id = "tiny"
            name = "Tiny"

            [license]
            license_type = "public_domain"

            [fetcher]
            urls = ["https://example.com/tiny.csv"]
            "#,
        )
        .unwrap();

        assert_eq!(def.id, "tiny");
        assert!(def.cleaning.select.is_empty());
        assert!(def.reshape.is_none());
        assert_eq!(def.fetcher.compressed, None);
    }

    #[test]
    fn parses_cleaning_tables() {
        let def = parse_dataset_toml(
            r#"
            id = "people"
            name = "People"

            [license]
            license_type = "open_data"

            [fetcher]
            urls = ["people.csv"]
            compressed = "gzip"

            [cleaning]
            select = ["AGE", "SEX"]

            [cleaning.fill]
            AGE = "UNKNOWN"

            [cleaning.substitute.AGE]
            "940" = "UNKNOWN"

            [cleaning.domains]
            SEX = ["F", "M", "U"]
            "#,
        )
        .unwrap();

        assert_eq!(def.fetcher.compressed.as_deref(), Some("gzip"));
        assert_eq!(def.cleaning.select, vec!["AGE", "SEX"]);
        assert_eq!(def.cleaning.fill["AGE"], "UNKNOWN");
        assert_eq!(def.cleaning.substitute["AGE"]["940"], "UNKNOWN");
        assert_eq!(def.cleaning.domains["SEX"], vec!["F", "M", "U"]);
    }

    #[test]
    fn rejects_definition_without_fetcher() {
        let err = parse_dataset_toml(
            r#"
            id = "broken"
            name = "Broken"

            [license]
            license_type = "open_data"
            "#,
        )
        .unwrap_err();
        assert!(err.contains("fetcher"), "unexpected error: {err}");
    }

    #[test]
    fn with_locations_overrides_urls() {
        let def = parse_dataset_toml(
            r#"
            id = "tiny"
            name = "Tiny"

            [license]
            license_type = "public_domain"

            [fetcher]
            urls = ["https://example.com/tiny.csv"]
            "#,
        )
        .unwrap()
        .with_locations(vec!["/tmp/tiny.csv".to_string()]);

        assert_eq!(def.fetcher.urls, vec!["/tmp/tiny.csv"]);
    }
}
