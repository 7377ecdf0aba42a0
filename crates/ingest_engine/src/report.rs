use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ingest_core::{Entry, InvalidEntry, ProcessingResult, ProcessingStats};
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Ensure the report directory exists and accepts new files.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ReportError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| ReportError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(ReportError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| ReportError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| ReportError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes whole files via a sibling temp file and a rename, so readers never
/// see a half-written report.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, ReportError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| ReportError::Io(e.error))?;
        Ok(target)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectsReport<'a> {
    generated_at: DateTime<Utc>,
    stats: &'a ProcessingStats,
    invalid_entries: &'a [InvalidEntry],
    duplicates: &'a [Entry],
}

/// Write the lines a processing run did not accept as JSON.
pub fn write_rejects_report(
    dir: &Path,
    filename: &str,
    result: &ProcessingResult,
) -> Result<PathBuf, ReportError> {
    let report = RejectsReport {
        generated_at: Utc::now(),
        stats: &result.stats,
        invalid_entries: &result.invalid_entries,
        duplicates: &result.duplicates,
    };
    let content = serde_json::to_vec_pretty(&report)?;
    AtomicFileWriter::new(dir.to_path_buf()).write(filename, &content)
}
