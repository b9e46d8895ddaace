//! Extraction results and their CSV form.
//!
//! CSV files are UTF-8 with a leading byte-order mark so spreadsheet tools
//! open CJK text correctly.

use crate::error::TranscriptError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// UTF-8 byte-order mark written before the CSV header.
pub const UTF8_BOM: &str = "\u{FEFF}";

/// One course taken from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub academic_year: String,
    pub semester: String,
    pub subject_name: String,
    /// Credit hours, never negative.
    pub credit: f64,
    pub grade_token: String,
    /// 1-based index of the table the record came from; 0 for OCR records.
    pub source_table_index: usize,
}

/// Everything a run produces.
///
/// `total_credits` is always the sum of `credit` over `passed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub total_credits: f64,
    pub passed: Vec<CourseRecord>,
    pub failed: Vec<CourseRecord>,
}

impl PipelineOutput {
    /// True when no course was recognised at all.
    pub fn is_empty(&self) -> bool {
        self.passed.is_empty() && self.failed.is_empty()
    }

    /// Credits still missing to reach `target`; negative when exceeded.
    pub fn credit_shortfall(&self, target: f64) -> f64 {
        target - self.total_credits
    }

    /// Write the passed list as CSV.
    pub fn write_passed_csv<W: Write>(&self, writer: W) -> Result<(), TranscriptError> {
        write_records(writer, &self.passed, false)
    }

    /// Write the failed list as CSV, including `source_table_index`.
    pub fn write_failed_csv<W: Write>(&self, writer: W) -> Result<(), TranscriptError> {
        write_records(writer, &self.failed, true)
    }
}

/// Which list [`write_csv_file`] exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordList {
    Passed,
    Failed,
}

/// Write one list to `path` atomically.
///
/// The CSV goes to a temporary file in the destination directory which is
/// then renamed over `path`, so readers never see a half-written file.
pub fn write_csv_file(
    output: &PipelineOutput,
    list: RecordList,
    path: &Path,
) -> Result<(), TranscriptError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source| TranscriptError::CsvWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    match list {
        RecordList::Passed => output.write_passed_csv(tmp.as_file_mut()),
        RecordList::Failed => output.write_failed_csv(tmp.as_file_mut()),
    }
    .map_err(|e| with_path(path, e))?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {:?} records to {}", list, path.display());
    Ok(())
}

/// Name the destination file in a serialisation failure.
fn with_path(path: &Path, err: TranscriptError) -> TranscriptError {
    match err {
        TranscriptError::Csv(e) => TranscriptError::CsvWriteFailed {
            path: path.to_path_buf(),
            source: e.into(),
        },
        other => other,
    }
}

fn write_records<W: Write>(
    mut writer: W,
    records: &[CourseRecord],
    with_source: bool,
) -> Result<(), TranscriptError> {
    writer
        .write_all(UTF8_BOM.as_bytes())
        .map_err(csv::Error::from)?;

    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec![
        "academic_year",
        "semester",
        "subject_name",
        "credit",
        "grade_token",
    ];
    if with_source {
        header.push("source_table_index");
    }
    csv.write_record(&header)?;

    for r in records {
        let credit = format!("{:?}", r.credit);
        let mut row = vec![
            r.academic_year.as_str(),
            r.semester.as_str(),
            r.subject_name.as_str(),
            credit.as_str(),
            r.grade_token.as_str(),
        ];
        let source = r.source_table_index.to_string();
        if with_source {
            row.push(source.as_str());
        }
        csv.write_record(&row)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}
