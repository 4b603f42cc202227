//! CSV loader.
//!
//! Reads a CSV (optionally gzip-compressed) from a URL or a local path and
//! parses it into a [`Table`]. Empty fields become `None`, the explicit
//! missing marker the cleaner fills from. A failed download is fatal; there
//! is no retry.

use std::io::Read as _;
use std::sync::Arc;

use data_reports_dataset_models::Table;

use crate::dataset_def::FetcherConfig;
use crate::progress::ProgressCallback;
use crate::{DatasetError, FetchOptions};

/// Loads a single CSV file.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    /// URL or filesystem path of the CSV file.
    location: String,
    /// Whether the content is gzip-compressed.
    is_gzipped: bool,
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
    /// Optional cap on the number of records to parse.
    max_records: Option<u64>,
}

impl CsvLoader {
    /// Creates a loader for the given location with default settings
    /// (comma-delimited, not gzipped, no record limit).
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_owned(),
            is_gzipped: false,
            delimiter: b',',
            max_records: None,
        }
    }

    /// Marks the content as gzip-compressed.
    #[must_use]
    pub const fn with_gzip(mut self, gzipped: bool) -> Self {
        self.is_gzipped = gzipped;
        self
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Limits the number of records parsed from the file.
    #[must_use]
    pub const fn with_max_records(mut self, max: u64) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Whether the location is downloaded over HTTP rather than read from
    /// disk.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    /// Fetches the raw bytes, decompressing if configured.
    async fn fetch_bytes(&self) -> Result<Vec<u8>, DatasetError> {
        let bytes = if self.is_remote() {
            let response = reqwest::Client::new()
                .get(&self.location)
                .send()
                .await?
                .error_for_status()?;
            response.bytes().await?.to_vec()
        } else {
            tokio::fs::read(&self.location).await?
        };

        log::debug!("Read {} bytes from {}", bytes.len(), self.location);

        if !self.is_gzipped {
            return Ok(bytes);
        }

        let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        log::debug!("Decompressed to {} bytes", decompressed.len());
        Ok(decompressed)
    }

    /// Downloads (or reads) and parses the CSV.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the fetch fails, the server answers with
    /// an error status, or the content is not valid CSV.
    pub async fn load(&self) -> Result<Table, DatasetError> {
        let bytes = self.fetch_bytes().await?;
        let table = parse_csv(&bytes, self.delimiter, self.max_records)?;

        log::info!(
            "Parsed {} records ({} columns) from {}",
            table.len(),
            table.columns.len(),
            self.location
        );

        Ok(table)
    }
}

/// Parses CSV bytes into a [`Table`].
///
/// Headers and cells are trimmed; empty cells become `None`. Rows shorter
/// than the header are padded with missing cells. The header is read even
/// when `max_records` is zero.
///
/// # Errors
///
/// Returns [`DatasetError`] if the header row is absent or a record cannot
/// be read.
pub fn parse_csv(
    bytes: &[u8],
    delimiter: u8,
    max_records: Option<u64>,
) -> Result<Table, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    if columns.iter().all(String::is_empty) {
        return Err(DatasetError::Parse {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut table = Table::new(columns);
    let max = max_records.map_or(usize::MAX, |m| usize::try_from(m).unwrap_or(usize::MAX));

    for result in reader.records().take(max) {
        let record = result?;
        let row = record
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| cell.to_owned())
            })
            .collect();
        table.push_row(row);
    }

    if table.len() == max {
        log::info!("Reached max_records limit ({max}), stopped CSV parse");
    }

    Ok(table)
}

/// Loads every file of a dataset and concatenates them into one table.
///
/// # Errors
///
/// Returns [`DatasetError`] if any file fails to load or the files disagree
/// on their headers.
pub async fn load_dataset(
    label: &str,
    config: &FetcherConfig,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Table, DatasetError> {
    if config.urls.is_empty() {
        return Err(DatasetError::Definition {
            message: format!("{label}: no locations configured"),
        });
    }

    progress.set_total(config.urls.len() as u64);
    let mut combined: Option<Table> = None;

    for (i, location) in config.urls.iter().enumerate() {
        let loaded = combined.as_ref().map_or(0, |t| t.len() as u64);

        // Stop once the overall limit is reached; the first file is always
        // read so the table keeps its header
        if let Some(limit) = options.limit
            && combined.is_some()
            && loaded >= limit
        {
            log::info!("[{label}] Reached limit of {limit} records");
            break;
        }

        log::info!(
            "[{label}] Loading CSV {}/{}: {location}",
            i + 1,
            config.urls.len()
        );
        progress.set_message(format!("[{label}] {location}"));

        let mut loader = CsvLoader::new(location);

        if let Some(delim) = config.delimiter.as_deref()
            && let Some(byte) = delim.as_bytes().first()
        {
            loader = loader.with_delimiter(*byte);
        }

        if config.compressed.as_deref() == Some("gzip") {
            loader = loader.with_gzip(true);
        }

        // Cap max_records per file by the remaining budget
        let remaining = options.limit.map(|l| l.saturating_sub(loaded));
        let file_limit = match (config.max_records, remaining) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if let Some(limit) = file_limit {
            loader = loader.with_max_records(limit);
        }

        let table = loader.load().await?;
        progress.inc(1);

        combined = Some(match combined {
            None => table,
            Some(mut acc) => {
                if acc.columns != table.columns {
                    return Err(DatasetError::Parse {
                        message: format!("{label}: header of {location} differs from first file"),
                    });
                }
                acc.rows.extend(table.rows);
                acc
            }
        });
    }

    let table = combined.unwrap_or_default();
    progress.finish(format!("[{label}] loaded {} records", table.len()));
    log::info!("[{label}] Load complete: {} records", table.len());

    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::progress::null_progress;

    fn config(urls: Vec<String>) -> FetcherConfig {
        FetcherConfig {
            urls,
            delimiter: None,
            compressed: None,
            max_records: None,
        }
    }

    #[test]
    fn empty_fields_become_missing() {
        let table = parse_csv(b"A,B,C\n1,,x\n, 2 ,\n", b',', None).unwrap();

        assert_eq!(table.columns, vec!["A", "B", "C"]);
        assert_eq!(
            table.rows[0],
            vec![Some("1".to_string()), None, Some("x".to_string())]
        );
        assert_eq!(table.rows[1], vec![None, Some("2".to_string()), None]);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = parse_csv(b"A,B\n1\n", b',', None).unwrap();
        assert_eq!(table.rows[0], vec![Some("1".to_string()), None]);
    }

    #[test]
    fn respects_max_records_and_delimiter() {
        let table = parse_csv(b"A\tB\n1\t2\n3\t4\n5\t6\n", b'\t', Some(2)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, 1), Some("4"));
    }

    #[test]
    fn quoted_headers_with_slashes_survive() {
        let table = parse_csv(
            b"Province/State,Country/Region,Lat,Long,1/22/20\n,\"Korea, South\",36.0,128.0,1\n",
            b',',
            None,
        )
        .unwrap();
        assert_eq!(table.columns[4], "1/22/20");
        assert_eq!(table.value(0, 1), Some("Korea, South"));
        assert_eq!(table.value(0, 0), None);
    }

    #[tokio::test]
    async fn loads_local_files_and_concatenates() {
        let dir = std::env::temp_dir().join("data_reports_loader_concat");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("a.csv");
        let second = dir.join("b.csv");
        std::fs::write(&first, "K,V\na,1\nb,2\n").unwrap();
        std::fs::write(&second, "K,V\nc,3\n").unwrap();

        let table = load_dataset(
            "test",
            &config(vec![
                first.display().to_string(),
                second.display().to_string(),
            ]),
            &FetchOptions::default(),
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.value(2, 0), Some("c"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn limit_spans_files() {
        let dir = std::env::temp_dir().join("data_reports_loader_limit");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("a.csv");
        let second = dir.join("b.csv");
        std::fs::write(&first, "K\na\nb\n").unwrap();
        std::fs::write(&second, "K\nc\nd\n").unwrap();

        let table = load_dataset(
            "test",
            &config(vec![
                first.display().to_string(),
                second.display().to_string(),
            ]),
            &FetchOptions { limit: Some(3) },
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(table.len(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn zero_limit_keeps_the_header() {
        let dir = std::env::temp_dir().join("data_reports_loader_zero_limit");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a.csv");
        std::fs::write(&path, "BORO,OCCUR_DATE
BRONX,01/01/2020
").unwrap();

        let table = load_dataset(
            "test",
            &config(vec![path.display().to_string()]),
            &FetchOptions { limit: Some(0) },
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(table.columns, vec!["BORO", "OCCUR_DATE"]);
        assert!(table.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn rejects_mismatched_headers() {
        let dir = std::env::temp_dir().join("data_reports_loader_mismatch");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("a.csv");
        let second = dir.join("b.csv");
        std::fs::write(&first, "K,V\na,1\n").unwrap();
        std::fs::write(&second, "K,W\nb,2\n").unwrap();

        let err = load_dataset(
            "test",
            &config(vec![
                first.display().to_string(),
                second.display().to_string(),
            ]),
            &FetchOptions::default(),
            &null_progress(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DatasetError::Parse { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn reads_gzipped_files_with_configured_delimiter() {
        let dir = std::env::temp_dir().join("data_reports_loader_gzip");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("a.csv.gz");

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"K;V\nx;9\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let mut config = config(vec![path.display().to_string()]);
        config.delimiter = Some(";".to_string());
        config.compressed = Some("gzip".to_string());

        let table = load_dataset("test", &config, &FetchOptions::default(), &null_progress())
            .await
            .unwrap();
        assert_eq!(table.columns, vec!["K", "V"]);
        assert_eq!(table.value(0, 1), Some("9"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_local_file_is_fatal() {
        let err = CsvLoader::new("/nonexistent/data_reports/missing.csv")
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }

    #[test]
    fn detects_remote_locations() {
        assert!(CsvLoader::new("https://example.com/a.csv").is_remote());
        assert!(!CsvLoader::new("data/a.csv").is_remote());
    }
}
