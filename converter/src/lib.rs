//! # Buildings Converter - spreadsheet to consolidated CSV migration
//!
//! Reads building/broadband workbooks (one sheet per price profile) and writes
//! two import-ready CSV files: the buildings, and one provider association
//! per building.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────────────────────┐
//! │  Workbooks  │────▶│   Reader    │────▶│  Transform  │────▶│ <city>_Consolidated_*.csv    │
//! │ (xlsx/ods…) │     │ (calamine)  │     │ (ids+stamp) │     │ (Buildings + Providers)      │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use buildings_converter::{run, ConverterConfig};
//!
//! let config = ConverterConfig::from_file("converter.json")?;
//! let summary = run(&config)?;
//! println!("{} buildings written", summary.rows_written);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`config`] - Run configuration
//! - [`models`] - Building and provider records
//! - [`reader`] - Workbook reading
//! - [`transform`] - Row mapping and the batch pipeline
//! - [`writer`] - Consolidated CSV outputs
//! - [`merge`] - Concatenating CSV exports

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Input
pub mod reader;

// Transformation
pub mod transform;

// Output
pub mod merge;
pub mod writer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConvertError, MergeError, ReaderError, SheetError, TransformError, WriterError,
};

// =============================================================================
// Re-exports - Configuration & models
// =============================================================================

pub use config::{ConverterConfig, ProfileAssignment, ProfileLookup};
pub use models::{BuildingRecord, ProviderRecord, BUILDING_HEADER, PROVIDER_HEADER};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use reader::{SheetSource, Workbook};
pub use transform::{
    run, Clock, Converter, FixedClock, IdGenerator, RowRecords, RowTransformer, RunSummary,
    SystemClock, UuidV7Ids,
};
pub use writer::{OutputFiles, RecordWriter};

// =============================================================================
// Re-exports - Merge
// =============================================================================

pub use merge::{merge_csv_files, merge_profile_exports, MergeSummary};
