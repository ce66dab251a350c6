//! Spreadsheet reading.
//!
//! [`Workbook`] wraps a `calamine` workbook (xlsx, xlsm, xlsb, xls, ods) and
//! turns each sheet into rows of plain text cells. Rows are positional from
//! cell A1 and trailing empty cells are trimmed, so `row.len()` is the number
//! of populated positions.
//!
//! The orchestrator only sees the [`SheetSource`] trait, which lets tests feed
//! it in-memory sheets.

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ReaderError, ReaderResult};

/// A raw spreadsheet row.
pub type Row = Vec<String>;

/// Anything that can list sheets and hand back their rows.
pub trait SheetSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// All rows of a sheet, header included.
    fn rows(&mut self, sheet: &str) -> ReaderResult<Vec<Row>>;
}

/// An open workbook. The file handle is released when this is dropped.
pub struct Workbook {
    path: PathBuf,
    inner: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Open a workbook, picking the format from the file extension.
    pub fn open(path: impl AsRef<Path>) -> ReaderResult<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = open_workbook_auto(&path).map_err(|source| ReaderError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn rows(&mut self, sheet: &str) -> ReaderResult<Vec<Row>> {
        let range = self
            .inner
            .worksheet_range(sheet)
            .map_err(|source| ReaderError::Read {
                sheet: sheet.to_string(),
                source,
            })?;
        Ok(range_to_rows(&range))
    }
}

/// Convert a used range into rows anchored at A1.
///
/// `calamine` ranges start at the first used cell, so leading empty rows and
/// columns are padded back in.
pub fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Row> = vec![Vec::new(); start_row as usize];
    for cells in range.rows() {
        let mut row: Row = vec![String::new(); start_col as usize];
        row.extend(cells.iter().map(cell_text));
        trim_trailing_empty(&mut row);
        rows.push(row);
    }
    rows
}

/// Text of a single cell.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

fn trim_trailing_empty(row: &mut Row) {
    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
}
