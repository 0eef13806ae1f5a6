//! Excel workbook input.
//!
//! Only the first worksheet is read. Its first row is the header; every
//! cell is rendered to text and cleaned exactly like a delimited row.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::columns::ColumnMap;
use crate::{Dataset, IngestConfig, IngestError, RowCleaner};

/// Reads and cleans the first worksheet of a workbook.
///
/// # Errors
///
/// Returns [`IngestError::Workbook`] if the file cannot be opened or the
/// sheet cannot be read, [`IngestError::NoWorksheet`] if the workbook is
/// empty, or [`IngestError::EmptyInput`] if the sheet has no header row or
/// no row survives cleaning.
pub fn read_workbook(path: &Path, config: &IngestConfig) -> Result<Dataset, IngestError> {
    let mut workbook = open_workbook_auto(path)?;
    if let Some(name) = workbook.sheet_names().first() {
        log::debug!("Reading worksheet '{name}'");
    }
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoWorksheet)??;

    let first_line = range.start().map_or(1, |(row, _)| u64::from(row) + 1);
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());

    let headers = rows.next().ok_or(IngestError::EmptyInput)?;
    let columns = ColumnMap::resolve(headers.iter().map(String::as_str))?;
    let mut cleaner = RowCleaner::new(columns, config);

    for (line, row) in (first_line + 1..).zip(rows) {
        cleaner.push(line, |idx| row.get(idx).map_or("", String::as_str))?;
    }

    cleaner.finish()
}

/// Text form of a cell. Whole floats print without a fractional part.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
