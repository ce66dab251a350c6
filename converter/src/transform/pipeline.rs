//! Batch orchestration: workbooks → sheets → rows → consolidated CSVs.
//!
//! # Example
//!
//! ```rust,ignore
//! use buildings_converter::{run, ConverterConfig};
//!
//! let summary = run(&ConverterConfig::default())?;
//! println!("{} buildings written", summary.rows_written);
//! ```
//!
//! Failure handling follows the batch's error taxonomy:
//!
//! - output files cannot be created: the run stops
//! - a workbook cannot be opened: that file is skipped
//! - a sheet cannot be read, has no data rows, or a write fails: that sheet
//!   is abandoned (rows already written stay)
//! - the positional price profile list runs out: remaining sheets in the
//!   file are skipped with a warning
//! - a row is too short: that row is skipped

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::{Clock, IdGenerator, RowTransformer};
use crate::config::{ConverterConfig, ProfileLookup};
use crate::error::{ConvertResult, ReaderResult, SheetError, TransformError};
use crate::reader::{SheetSource, Workbook};
use crate::writer::OutputFiles;

/// Counters for a whole run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub files_opened: usize,
    pub files_failed: usize,
    pub sheets_processed: usize,
    pub sheets_failed: usize,
    pub sheets_skipped: usize,
    /// Rows that produced a building and a provider record
    pub rows_written: usize,
    pub rows_skipped: usize,
}

impl RunSummary {
    fn log(&self) {
        info!(
            files_opened = self.files_opened,
            files_failed = self.files_failed,
            sheets_processed = self.sheets_processed,
            sheets_failed = self.sheets_failed,
            sheets_skipped = self.sheets_skipped,
            rows_written = self.rows_written,
            rows_skipped = self.rows_skipped,
            "Run summary"
        );
    }
}

/// Convert every configured workbook into the two consolidated files.
///
/// Only failing to create or flush the outputs is an error; everything else
/// is logged and counted in the returned summary.
pub fn run(config: &ConverterConfig) -> ConvertResult<RunSummary> {
    config.validate()?;
    if config.inputs.is_empty() {
        warn!("No input workbooks configured, output files will only hold headers");
    }
    if !config.has_profiles() {
        warn!("No price profiles configured, every sheet will be skipped");
    }

    let mut outputs = OutputFiles::create(config)?;
    if let Some((buildings, providers)) = outputs.paths() {
        info!(
            buildings = %buildings.display(),
            providers = %providers.display(),
            "Created consolidated CSV files"
        );
    }

    let mut converter = Converter::new(config, RowTransformer::from_config(config));
    let summary = converter.convert_files(&mut outputs, |path: &Path| Workbook::open(path));

    outputs.finish()?;
    summary.log();
    info!("Consolidated CSV files generated successfully");
    Ok(summary)
}

/// Drives the transformer over workbooks and writes the results.
pub struct Converter<'a, I, C> {
    config: &'a ConverterConfig,
    transformer: RowTransformer<I, C>,
}

impl<'a, I: IdGenerator, C: Clock> Converter<'a, I, C> {
    pub fn new(config: &'a ConverterConfig, transformer: RowTransformer<I, C>) -> Self {
        Self {
            config,
            transformer,
        }
    }

    /// Process every configured input in order, opening each with `open`.
    ///
    /// Each workbook is dropped, and its file handle released, before the
    /// next one is opened.
    pub fn convert_files<S, W, F>(&mut self, outputs: &mut OutputFiles<W>, mut open: F) -> RunSummary
    where
        S: SheetSource,
        W: Write,
        F: FnMut(&Path) -> ReaderResult<S>,
    {
        let config = self.config;
        let mut summary = RunSummary::default();

        for path in &config.inputs {
            info!(file = %path.display(), "Opening workbook");

            let mut source = match open(path.as_path()) {
                Ok(source) => source,
                Err(e) => {
                    error!(file = %path.display(), error = %e, "Failed to open workbook");
                    summary.files_failed += 1;
                    continue;
                }
            };
            summary.files_opened += 1;

            self.convert_workbook(path, &mut source, outputs, &mut summary);
        }

        summary
    }

    /// Process the sheets of one open workbook.
    pub fn convert_workbook<S: SheetSource, W: Write>(
        &mut self,
        path: &Path,
        source: &mut S,
        outputs: &mut OutputFiles<W>,
        summary: &mut RunSummary,
    ) {
        let sheets = source.sheet_names();
        info!(file = %path.display(), sheets = ?sheets, "Sheets found");

        let config = self.config;
        let assignment = config.profile_assignment();

        for (index, sheet) in sheets.iter().enumerate() {
            let profile = match assignment.lookup(index, sheet) {
                ProfileLookup::Found(profile) => profile,
                ProfileLookup::Exhausted => {
                    warn!(
                        file = %path.display(),
                        sheet = %sheet,
                        remaining = sheets.len() - index,
                        "No more price profile ids, skipping remaining sheets"
                    );
                    summary.sheets_skipped += sheets.len() - index;
                    break;
                }
                ProfileLookup::Unmapped => {
                    warn!(file = %path.display(), sheet = %sheet, "No price profile mapped for sheet, skipping");
                    summary.sheets_skipped += 1;
                    continue;
                }
            };

            info!(file = %path.display(), sheet = %sheet, price_profile = profile, "Processing sheet");

            match self.convert_sheet(source, sheet, profile, outputs, summary) {
                Ok(()) => summary.sheets_processed += 1,
                Err(e) => {
                    error!(file = %path.display(), sheet = %sheet, error = %e, "Error processing sheet");
                    summary.sheets_failed += 1;
                }
            }
        }
    }

    /// Transform and write every data row of one sheet.
    ///
    /// The first row is the header. A write failure abandons the rest of the
    /// sheet; rows written before it are kept.
    pub fn convert_sheet<S: SheetSource, W: Write>(
        &mut self,
        source: &mut S,
        sheet: &str,
        price_profile_id: &str,
        outputs: &mut OutputFiles<W>,
        summary: &mut RunSummary,
    ) -> Result<(), SheetError> {
        let rows = source.rows(sheet)?;
        if rows.len() < 2 {
            return Err(SheetError::NoData {
                sheet: sheet.to_string(),
            });
        }

        for (index, row) in rows.iter().enumerate().skip(1) {
            match self.transformer.transform(row, price_profile_id) {
                Ok(records) => {
                    outputs.write_building(&records.building)?;
                    outputs.write_provider(&records.provider)?;
                    summary.rows_written += 1;
                }
                Err(TransformError::SkipRow { cells }) => {
                    debug!(sheet, row = index + 1, cells, "Skipping short row");
                    summary.rows_skipped += 1;
                }
                Err(e) => {
                    warn!(sheet, row = index + 1, error = %e, "Skipping row");
                    summary.rows_skipped += 1;
                }
            }
        }

        Ok(())
    }
}
