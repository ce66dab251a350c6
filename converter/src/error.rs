//! Error types for the buildings converter.
//!
//! Each stage of the batch has its own error enum:
//!
//! - [`ReaderError`] - Opening workbooks and reading sheets
//! - [`TransformError`] - Rows that cannot become records
//! - [`WriterError`] - Creating and writing the consolidated CSV files
//! - [`SheetError`] - Why a single sheet was abandoned
//! - [`ConfigError`] - Loading and checking the run configuration
//! - [`MergeError`] - Concatenating CSV exports
//! - [`ConvertError`] - Top-level errors that end a run
//!
//! Only [`ConvertError`] ever reaches `main`. Everything below it is logged
//! where it happens and the batch moves on.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Spreadsheet Reader Errors
// =============================================================================

/// Errors while opening a workbook or reading one of its sheets.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The workbook is missing, corrupt or in an unsupported format.
    #[error("Failed to open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// A sheet could not be parsed.
    #[error("Failed to read sheet '{sheet}': {source}")]
    Read {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

// =============================================================================
// Row Transformer Errors
// =============================================================================

/// Reasons a row does not produce records.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// Fewer than four populated cells.
    #[error("Row has {cells} populated cells, expected at least 4")]
    SkipRow { cells: usize },

    /// Coordinate rejected by the strict coordinate check.
    #[error("Invalid {field} '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },
}

// =============================================================================
// CSV Writer Errors
// =============================================================================

/// Errors from the consolidated CSV outputs.
#[derive(Debug, Error)]
pub enum WriterError {
    /// Output file could not be created.
    #[error("Failed to create output file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the underlying stream failed.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Sheet Errors
// =============================================================================

/// Why a sheet was abandoned. Logged by the orchestrator, never propagated.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Rows could not be read.
    #[error(transparent)]
    Read(#[from] ReaderError),

    /// Only a header row, or nothing at all.
    #[error("Sheet '{sheet}' has no data rows")]
    NoData { sheet: String },

    /// Writing a record failed part-way through the sheet.
    #[error("Failed to write record: {0}")]
    Write(#[from] WriterError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading or checking a [`crate::config::ConverterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected shape.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parsed but is unusable.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// Merge Errors
// =============================================================================

/// Errors while concatenating CSV exports.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Reading an input or writing the output failed.
    #[error("Merge IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input could not be parsed as CSV, or the output could not be written.
    #[error("Merge CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input bytes could not be decoded.
    #[error("Failed to decode input: {0}")]
    Encoding(String),

    /// None of the inputs existed or matched.
    #[error("No input files to merge")]
    NoInputs,
}

// =============================================================================
// Top-level Errors
// =============================================================================

/// Errors that halt a run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Output files could not be created or flushed.
    #[error("Output error: {0}")]
    Output(#[from] WriterError),

    /// Merge error.
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Reading a workbook for inspection failed.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// A summary could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Result type for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Result type for a whole run.
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // WriterError -> SheetError
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let sheet_err: SheetError = WriterError::from(io).into();
        assert!(sheet_err.to_string().contains("pipe closed"));

        // ConfigError -> ConvertError
        let convert_err: ConvertError = ConfigError::Invalid("city is empty".into()).into();
        assert!(convert_err.to_string().contains("city is empty"));
    }

    #[test]
    fn test_skip_row_format() {
        let err = TransformError::SkipRow { cells: 2 };
        let msg = err.to_string();
        assert!(msg.contains("2 populated cells"));
        assert!(msg.contains("at least 4"));
    }

    #[test]
    fn test_no_data_names_sheet() {
        let err = SheetError::NoData { sheet: "Paris".into() };
        assert_eq!(err.to_string(), "Sheet 'Paris' has no data rows");
    }

    #[test]
    fn test_create_error_names_path() {
        let err = WriterError::Create {
            path: PathBuf::from("out/France_Consolidated_Buildings.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        assert!(err.to_string().contains("France_Consolidated_Buildings.csv"));
    }
}
