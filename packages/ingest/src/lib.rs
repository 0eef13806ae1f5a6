#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spreadsheet ingestion for ranked location data.
//!
//! Reads Excel workbooks or delimited text exports with `latitude`,
//! `longitude` and `title` columns (plus optional `rank` and `url`), drops
//! rows whose coordinates cannot be coerced or are out of range, and turns
//! rank cells into [`RankValue`]s. The output is a cleaned list of
//! [`LocationRecord`]s ready for analysis.

pub mod columns;
pub mod rank;
pub mod workbook;

use std::io::Read;
use std::path::{Path, PathBuf};

use rank_map_analysis_models::{LocationRecord, RankValue};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::columns::ColumnMap;
use crate::rank::{DEFAULT_SPECIAL_TOKEN, coerce_rank};

/// File extensions picked up by [`find_input_files`].
pub const INPUT_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv", "tsv"];

/// Errors that can occur while reading location data.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited text could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required columns are absent from the header row.
    #[error("Missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        /// Names of the absent columns.
        missing: Vec<String>,
    },

    /// A rank cell is neither blank, the special token, nor a number.
    #[error("Invalid rank '{value}' on line {line}")]
    InvalidRank {
        /// 1-based line number in the input, header included.
        line: u64,
        /// The offending cell text.
        value: String,
    },

    /// The workbook could not be opened or read.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// The workbook has no worksheet to read.
    #[error("Workbook has no worksheets")]
    NoWorksheet,

    /// The configured delimiter is not a single-byte character.
    #[error("Invalid delimiter '{0}': must be a single ASCII character")]
    InvalidDelimiter(char),

    /// No rows survived cleaning.
    #[error("No valid location rows found")]
    EmptyInput,
}

/// What to do with rank cells that cannot be coerced.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvalidRankPolicy {
    /// Fail the whole read with [`IngestError::InvalidRank`].
    #[default]
    Reject,
    /// Log a warning and treat the cell as unranked.
    Unranked,
}

/// Ingestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct IngestConfig {
    /// Exact cell text that marks a special rank.
    pub special_rank_token: String,
    /// Handling of uncoercible rank cells.
    pub invalid_rank: InvalidRankPolicy,
    /// Field delimiter.
    pub delimiter: char,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            special_rank_token: DEFAULT_SPECIAL_TOKEN.to_string(),
            invalid_rank: InvalidRankPolicy::default(),
            delimiter: ',',
        }
    }
}

/// Cleaned records plus bookkeeping about what was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Rows that passed cleaning, in input order.
    pub records: Vec<LocationRecord>,
    /// Data rows read, before cleaning.
    pub total_rows: usize,
    /// Rows dropped for bad or out-of-range coordinates.
    pub dropped_rows: usize,
    /// Whether the input had a `rank` column.
    pub has_rank: bool,
    /// Whether the input had a `url` column.
    pub has_url: bool,
}

/// Reads and cleans a location file.
///
/// `.xlsx` and `.xls` files are read from their first worksheet. Anything
/// else is treated as delimited text; a `.tsv` file is read tab-separated
/// unless the config names a delimiter other than the default comma.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be opened or parsed, or any
/// of the conditions listed on [`parse_records`].
pub fn read_records(path: &Path, config: &IngestConfig) -> Result<Dataset, IngestError> {
    log::info!("Reading {}", path.display());

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if matches!(extension.as_deref(), Some("xlsx" | "xls")) {
        return workbook::read_workbook(path, config);
    }

    let file = std::fs::File::open(path)?;
    if extension.as_deref() == Some("tsv") && config.delimiter == ',' {
        let config = IngestConfig {
            delimiter: '\t',
            ..config.clone()
        };
        return parse_records(file, &config);
    }

    parse_records(file, config)
}

/// Parses and cleans delimited location data from any reader.
///
/// # Errors
///
/// Returns [`IngestError::MissingColumns`] if a required column is absent,
/// [`IngestError::InvalidRank`] for an uncoercible rank under
/// [`InvalidRankPolicy::Reject`], [`IngestError::EmptyInput`] if no row
/// survives cleaning, or a CSV error for malformed input.
pub fn parse_records<R: Read>(reader: R, config: &IngestConfig) -> Result<Dataset, IngestError> {
    let delimiter = u8::try_from(config.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(IngestError::InvalidDelimiter(config.delimiter))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::resolve(reader.headers()?.iter())?;
    let mut cleaner = RowCleaner::new(columns, config);

    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let line = row.position().map_or(i as u64 + 2, csv::Position::line);
        cleaner.push(line, |idx| row.get(idx).unwrap_or(""))?;
    }

    cleaner.finish()
}

/// Turns raw rows into cleaned records, independent of the file format.
pub(crate) struct RowCleaner<'a> {
    columns: ColumnMap,
    config: &'a IngestConfig,
    records: Vec<LocationRecord>,
    total_rows: usize,
    dropped_rows: usize,
}

impl<'a> RowCleaner<'a> {
    pub(crate) const fn new(columns: ColumnMap, config: &'a IngestConfig) -> Self {
        Self {
            columns,
            config,
            records: Vec::new(),
            total_rows: 0,
            dropped_rows: 0,
        }
    }

    /// Cleans one data row. `cell` returns the text at a column index, or
    /// an empty string past the end of the row.
    pub(crate) fn push<'r>(
        &mut self,
        line: u64,
        cell: impl Fn(usize) -> &'r str,
    ) -> Result<(), IngestError> {
        self.total_rows += 1;
        let columns = self.columns;

        let Some((latitude, longitude)) =
            parse_coordinates(cell(columns.latitude), cell(columns.longitude))
        else {
            log::debug!("Dropping line {line}: invalid coordinates");
            self.dropped_rows += 1;
            return Ok(());
        };

        let rank = match columns.rank {
            Some(idx) => rank_for_cell(cell(idx), line, self.config)?,
            None => RankValue::Unranked,
        };

        self.records.push(LocationRecord {
            latitude,
            longitude,
            title: cell(columns.title).trim().to_string(),
            rank,
            url: columns.url.and_then(|idx| clean_url(cell(idx))),
        });
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Dataset, IngestError> {
        if self.dropped_rows > 0 {
            log::warn!(
                "Dropped {} rows with invalid coordinates",
                self.dropped_rows
            );
        }
        log::info!("Kept {} of {} rows", self.records.len(), self.total_rows);

        if self.records.is_empty() {
            return Err(IngestError::EmptyInput);
        }

        Ok(Dataset {
            records: self.records,
            total_rows: self.total_rows,
            dropped_rows: self.dropped_rows,
            has_rank: self.columns.rank.is_some(),
            has_url: self.columns.url.is_some(),
        })
    }
}

fn rank_for_cell(raw: &str, line: u64, config: &IngestConfig) -> Result<RankValue, IngestError> {
    match coerce_rank(raw, &config.special_rank_token) {
        Ok(rank) => Ok(rank),
        Err(value) => match config.invalid_rank {
            InvalidRankPolicy::Reject => Err(IngestError::InvalidRank { line, value }),
            InvalidRankPolicy::Unranked => {
                log::warn!("Treating invalid rank '{value}' on line {line} as unranked");
                Ok(RankValue::Unranked)
            }
        },
    }
}

/// Parses a latitude/longitude pair. Returns `None` if either value is
/// missing, not a finite number, or outside the valid degree range.
#[must_use]
pub fn parse_coordinates(lat: &str, lng: &str) -> Option<(f64, f64)> {
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lng.trim().parse::<f64>().ok()?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some((latitude, longitude))
}

/// Trims a URL cell, treating blanks and spreadsheet null markers as absent.
#[must_use]
pub fn clean_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() || url.eq_ignore_ascii_case("nan") || url.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(url.to_string())
    }
}

/// Lists input files directly inside `dir`, sorted by name.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the directory cannot be read.
pub fn find_input_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        INPUT_EXTENSIONS
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    })
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const SAMPLE: &str = "\
latitude,longitude,title,rank,url
40.0,29.0,Alpha,1,https://example.com/a
40.001,29.001,Beta,5,
41.0,30.0,Gamma,%26%2310006%3B,nan
not-a-number,30.0,Broken,2,
95.0,30.0,OutOfRange,2,
40.5,29.5,Delta,,None
";

    #[test]
    fn parses_and_cleans_sample() {
        let dataset = parse_records(SAMPLE.as_bytes(), &IngestConfig::default()).unwrap();

        assert_eq!(dataset.total_rows, 6);
        assert_eq!(dataset.dropped_rows, 2);
        assert!(dataset.has_rank);
        assert!(dataset.has_url);

        let titles: Vec<&str> = dataset.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma", "Delta"]);

        assert_eq!(dataset.records[0].rank, RankValue::Numeric(1.0));
        assert_eq!(dataset.records[0].url.as_deref(), Some("https://example.com/a"));
        assert_eq!(dataset.records[1].url, None);
        assert_eq!(dataset.records[2].rank, RankValue::Special);
        assert_eq!(dataset.records[2].url, None);
        assert_eq!(dataset.records[3].rank, RankValue::Unranked);
        assert_eq!(dataset.records[3].url, None);
    }

    #[test]
    fn missing_rank_column_means_unranked() {
        let input = "latitude,longitude,title\n1.0,2.0,A\n";
        let dataset = parse_records(input.as_bytes(), &IngestConfig::default()).unwrap();
        assert!(!dataset.has_rank);
        assert_eq!(dataset.records[0].rank, RankValue::Unranked);
    }

    #[test]
    fn invalid_rank_is_rejected_by_default() {
        let input = "latitude,longitude,title,rank\n1.0,2.0,A,1\n1.0,2.0,B,top\n";
        let err = parse_records(input.as_bytes(), &IngestConfig::default()).unwrap_err();
        match err {
            IngestError::InvalidRank { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "top");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_rank_can_fall_back_to_unranked() {
        let input = "latitude,longitude,title,rank\n1.0,2.0,B,top\n";
        let config = IngestConfig {
            invalid_rank: InvalidRankPolicy::Unranked,
            ..IngestConfig::default()
        };
        let dataset = parse_records(input.as_bytes(), &config).unwrap();
        assert_eq!(dataset.records[0].rank, RankValue::Unranked);
    }

    #[test]
    fn custom_special_token() {
        let input = "latitude,longitude,title,rank\n1.0,2.0,A,20+\n";
        let config = IngestConfig {
            special_rank_token: "20+".to_string(),
            ..IngestConfig::default()
        };
        let dataset = parse_records(input.as_bytes(), &config).unwrap();
        assert_eq!(dataset.records[0].rank, RankValue::Special);
    }

    #[test]
    fn tab_delimited_input() {
        let input = "latitude\tlongitude\ttitle\n1.5\t2.5\tTabbed\n";
        let config = IngestConfig {
            delimiter: '\t',
            ..IngestConfig::default()
        };
        let dataset = parse_records(input.as_bytes(), &config).unwrap();
        assert!((dataset.records[0].longitude - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let config = IngestConfig {
            delimiter: '→',
            ..IngestConfig::default()
        };
        assert!(matches!(
            parse_records("".as_bytes(), &config),
            Err(IngestError::InvalidDelimiter('→'))
        ));
    }

    #[test]
    fn all_rows_invalid_is_empty_input() {
        let input = "latitude,longitude,title\nx,y,A\n";
        assert!(matches!(
            parse_records(input.as_bytes(), &IngestConfig::default()),
            Err(IngestError::EmptyInput)
        ));
    }

    #[test]
    fn missing_columns_error() {
        let input = "lat,lng,title\n1,2,A\n";
        assert!(matches!(
            parse_records(input.as_bytes(), &IngestConfig::default()),
            Err(IngestError::MissingColumns { .. })
        ));
    }

    #[test]
    fn coordinate_range_checks() {
        assert_eq!(parse_coordinates("90", "-180"), Some((90.0, -180.0)));
        assert_eq!(parse_coordinates("-90.1", "0"), None);
        assert_eq!(parse_coordinates("0", "180.5"), None);
        assert_eq!(parse_coordinates("NaN", "0"), None);
        assert_eq!(parse_coordinates("", "0"), None);
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dataset = read_records(file.path(), &IngestConfig::default()).unwrap();
        assert_eq!(dataset.records.len(), 4);
    }

    #[test]
    fn tsv_extension_switches_to_tabs() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        file.write_all(SAMPLE.replace(',', "\t").as_bytes()).unwrap();

        let dataset = read_records(file.path(), &IngestConfig::default()).unwrap();
        assert_eq!(dataset.records.len(), 4);
        assert_eq!(dataset.records[0].title, "Alpha");
    }

    #[test]
    fn finds_only_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.CSV", "c.tsv", "notes.txt", "sheet.xlsx", "deck.pptx"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let names: Vec<String> = find_input_files(dir.path())
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv", "c.tsv", "sheet.xlsx"]);
    }
}
