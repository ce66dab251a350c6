//! Consolidated CSV outputs.
//!
//! [`RecordWriter`] puts a fixed header in front of a `csv::Writer` and writes
//! it before anything else. [`OutputFiles`] owns the buildings and providers
//! writers of a run.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ConverterConfig;
use crate::error::{WriterError, WriterResult};
use crate::models::{BuildingRecord, ProviderRecord, BUILDING_HEADER, PROVIDER_HEADER};

/// Buffered CSV stream with a header.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a stream and write `header` as its first record.
    pub fn new(stream: W, header: &[&str]) -> WriterResult<Self> {
        let mut inner = csv::Writer::from_writer(stream);
        inner.write_record(header)?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append one data record.
    pub fn write_row<I, F>(&mut self, fields: I) -> WriterResult<()>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        self.inner.write_record(fields)?;
        self.rows += 1;
        Ok(())
    }

    /// Data records written so far, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> WriterResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying stream.
    pub fn into_inner(self) -> WriterResult<W> {
        self.inner
            .into_inner()
            .map_err(|e| {
                let err = e.error();
                WriterError::Io(std::io::Error::new(err.kind(), err.to_string()))
            })
    }
}

/// The two output streams of a run.
pub struct OutputFiles<W: Write = File> {
    buildings: RecordWriter<W>,
    providers: RecordWriter<W>,
    paths: Option<(PathBuf, PathBuf)>,
}

impl OutputFiles<File> {
    /// Create `<city>_Consolidated_Buildings.csv` and
    /// `<city>_Consolidated_Providers.csv` and write both headers.
    ///
    /// Existing files are truncated.
    pub fn create(config: &ConverterConfig) -> WriterResult<Self> {
        let buildings_path = config.buildings_path();
        let providers_path = config.providers_path();

        let buildings = RecordWriter::new(create_file(&buildings_path)?, &BUILDING_HEADER)?;
        let providers = RecordWriter::new(create_file(&providers_path)?, &PROVIDER_HEADER)?;

        Ok(Self {
            buildings,
            providers,
            paths: Some((buildings_path, providers_path)),
        })
    }
}

impl<W: Write> OutputFiles<W> {
    /// Outputs over arbitrary streams.
    pub fn from_writers(buildings: W, providers: W) -> WriterResult<Self> {
        Ok(Self {
            buildings: RecordWriter::new(buildings, &BUILDING_HEADER)?,
            providers: RecordWriter::new(providers, &PROVIDER_HEADER)?,
            paths: None,
        })
    }

    pub fn write_building(&mut self, record: &BuildingRecord) -> WriterResult<()> {
        self.buildings.write_row(record.to_row())
    }

    pub fn write_provider(&mut self, record: &ProviderRecord) -> WriterResult<()> {
        self.providers.write_row(record.to_row())
    }

    /// Output file paths, when backed by files.
    pub fn paths(&self) -> Option<(&Path, &Path)> {
        self.paths
            .as_ref()
            .map(|(b, p)| (b.as_path(), p.as_path()))
    }

    /// `(buildings, providers)` data rows written.
    pub fn counts(&self) -> (usize, usize) {
        (self.buildings.rows(), self.providers.rows())
    }

    /// Flush both streams and close them.
    ///
    /// Both are flushed even if the first fails; the first error is returned.
    pub fn finish(self) -> WriterResult<(W, W)> {
        let buildings = self.buildings.into_inner();
        let providers = self.providers.into_inner();
        Ok((buildings?, providers?))
    }
}

fn create_file(path: &Path) -> WriterResult<File> {
    File::create(path).map_err(|source| WriterError::Create {
        path: path.to_path_buf(),
        source,
    })
}
