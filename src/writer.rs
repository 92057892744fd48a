/// Output of an enrichment run
///
/// Two files are produced: the reconciled table as CSV, and a plain-text log
/// of every raw completion, named after the local time the run finished.
/// Neither write is atomic.
use crate::error::{EnrichError, Result};
use crate::reconcile::ReconciledTable;
use chrono::{DateTime, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the raw completion log goes and how it is named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogSink {
    pub dir: PathBuf,
    pub prefix: String,
}

impl Default for RawLogSink {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            prefix: "Personas".to_string(),
        }
    }
}

impl RawLogSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// `<prefix> YYYY-MM-DD HH MM SS.txt`; runs within the same second collide.
    pub fn file_name<Tz: TimeZone>(&self, finished_at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!("{} {}.txt", self.prefix, finished_at.format("%Y-%m-%d %H %M %S"))
    }

    pub fn path_for<Tz: TimeZone>(&self, finished_at: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.dir.join(self.file_name(finished_at))
    }

    /// Write the newline-joined raw responses and return the file path.
    pub fn write<Tz: TimeZone>(&self, responses: &[String], finished_at: &DateTime<Tz>) -> Result<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        let path = self.path_for(finished_at);
        fs::write(&path, responses.join("\n")).map_err(|source| EnrichError::Output {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Raw responses written to {}", path.display());
        Ok(path)
    }
}

/// Write the reconciled table as CSV with a header row.
pub fn write_reconciled(table: &ReconciledTable, path: &Path) -> Result<()> {
    let to_output_err = |e: csv::Error| EnrichError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(to_output_err)?;
    writer.write_record(&table.headers).map_err(to_output_err)?;
    for record in &table.records {
        writer.write_record(record.to_row()).map_err(to_output_err)?;
    }
    writer.flush().map_err(|source| EnrichError::Output {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Reconciled {} rows written to {}", table.len(), path.display());
    Ok(())
}
