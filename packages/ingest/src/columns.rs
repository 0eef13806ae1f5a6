//! Header resolution.

use crate::IngestError;

/// Columns every input must have.
pub const REQUIRED_COLUMNS: &[&str] = &["latitude", "longitude", "title"];

/// Columns that are used when present.
pub const OPTIONAL_COLUMNS: &[&str] = &["rank", "url"];

/// Positions of the known columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    /// Latitude column index.
    pub latitude: usize,
    /// Longitude column index.
    pub longitude: usize,
    /// Title column index.
    pub title: usize,
    /// Rank column index, if present.
    pub rank: Option<usize>,
    /// URL column index, if present.
    pub url: Option<usize>,
}

impl ColumnMap {
    /// Locates the known columns in `headers`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace and a
    /// leading byte-order mark. The first matching column wins.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingColumns`] listing every required column
    /// that was not found.
    pub fn resolve<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, IngestError> {
        let normalized: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
            .collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| (*name).to_string())
            .collect();

        let (Some(latitude), Some(longitude), Some(title)) =
            (find("latitude"), find("longitude"), find("title"))
        else {
            return Err(IngestError::MissingColumns { missing });
        };

        let map = Self {
            latitude,
            longitude,
            title,
            rank: find("rank"),
            url: find("url"),
        };

        let (present, absent): (Vec<&str>, Vec<&str>) = OPTIONAL_COLUMNS
            .iter()
            .partition(|name| find(name).is_some());
        if !present.is_empty() {
            log::info!("Found optional columns: {present:?}");
        }
        if !absent.is_empty() {
            log::info!("Optional columns not present (skipped): {absent:?}");
        }

        Ok(map)
    }
}
