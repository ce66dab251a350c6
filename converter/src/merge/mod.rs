//! Concatenate CSV exports that share a header.
//!
//! Per-profile exports (`New_York_PP1.csv_Building.csv`,
//! `New_York_PP2.csv_Building.csv`, ...) are merged into one file with a
//! single header. Inputs may be UTF-8, ISO-8859-1 or Windows-1252; the output
//! is always UTF-8.

use serde::Serialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{MergeError, MergeResult};

pub const DEFAULT_EXPORT_PREFIX: &str = "New_York_PP";
pub const DEFAULT_EXPORT_SUFFIX: &str = ".csv_Building.csv";
pub const DEFAULT_PROFILE_RANGE: RangeInclusive<u32> = 1..=13;

/// What a merge did.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub files_merged: usize,
    pub files_skipped: usize,
    pub rows_written: usize,
    pub header: Vec<String>,
}

/// Merge `inputs` into `output`, in order.
///
/// Missing inputs, inputs that fail to decode or parse, and inputs whose
/// header differs from the first merged file are skipped with a warning.
/// Fails with [`MergeError::NoInputs`] if nothing was merged, in which case
/// `output` is not created.
pub fn merge_csv_files<P: AsRef<Path>>(inputs: &[P], output: &Path) -> MergeResult<MergeSummary> {
    let mut summary = MergeSummary::default();
    let mut writer: Option<csv::Writer<fs::File>> = None;

    for input in inputs {
        let input = input.as_ref();
        if !input.exists() {
            warn!(file = %input.display(), "File does not exist, skipping");
            summary.files_skipped += 1;
            continue;
        }

        let (header, records) = match read_export(input) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(file = %input.display(), error = %e, "Unreadable CSV, skipping");
                summary.files_skipped += 1;
                continue;
            }
        };

        let out = match writer {
            Some(ref mut out) if header == summary.header => out,
            Some(_) => {
                warn!(
                    file = %input.display(),
                    expected = ?summary.header,
                    found = ?header,
                    "Header mismatch, skipping"
                );
                summary.files_skipped += 1;
                continue;
            }
            None => {
                let mut out = csv::Writer::from_path(output)?;
                out.write_record(&header)?;
                summary.header = header;
                writer.insert(out)
            }
        };

        info!(file = %input.display(), rows = records.len(), "Merging");
        for record in &records {
            out.write_record(record)?;
        }
        summary.rows_written += records.len();
        summary.files_merged += 1;
    }

    match writer {
        Some(mut out) => {
            out.flush()?;
            info!(
                output = %output.display(),
                files = summary.files_merged,
                rows = summary.rows_written,
                "Merged CSV saved"
            );
            Ok(summary)
        }
        None => Err(MergeError::NoInputs),
    }
}

/// Merge `<dir>/<prefix><n><suffix>` for every `n` in `range`.
pub fn merge_profile_exports(
    dir: &Path,
    prefix: &str,
    range: RangeInclusive<u32>,
    suffix: &str,
    output: &Path,
) -> MergeResult<MergeSummary> {
    let inputs = profile_export_paths(dir, prefix, range, suffix);
    merge_csv_files(&inputs, output)
}

pub fn profile_export_paths(
    dir: &Path,
    prefix: &str,
    range: RangeInclusive<u32>,
    suffix: &str,
) -> Vec<PathBuf> {
    range
        .map(|n| dir.join(format!("{prefix}{n}{suffix}")))
        .collect()
}

/// Header and records of one export.
fn read_export(path: &Path) -> MergeResult<(Vec<String>, Vec<csv::StringRecord>)> {
    let bytes = fs::read(path)?;
    let content = decode_content(&bytes, &detect_encoding(&bytes))?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok((header, records))
}

/// Detect the encoding of raw bytes using chardet.
///
/// Always one of `utf-8`, `iso-8859-1` or `windows-1252`. Any other guess
/// (chardet also tries Cyrillic, Greek and Turkish models on short inputs)
/// falls back to `windows-1252`.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, confidence, _language) = chardet::detect(bytes);

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => {
            debug!(
                charset = other,
                confidence,
                "Unexpected charset, assuming windows-1252"
            );
            "windows-1252".to_string()
        }
    }
}

/// Decode bytes to UTF-8 text. Valid UTF-8 is always accepted as-is.
pub fn decode_content(bytes: &[u8], encoding: &str) -> MergeResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    // WHATWG maps the latin1 label to windows-1252
    match encoding {
        "iso-8859-1" | "windows-1252" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        other => encoding_rs::Encoding::for_label(other.as_bytes())
            .map(|enc| enc.decode(bytes).0.into_owned())
            .ok_or_else(|| MergeError::Encoding(format!("unsupported encoding '{other}'"))),
    }
}
