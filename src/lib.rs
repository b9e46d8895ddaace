//! # transcript-credits
//!
//! Extract course-grade records from academic transcripts and total the
//! credits earned.
//!
//! ## Why this crate?
//!
//! Transcripts arrive as PDFs generated by registrar systems, as scans, or
//! as word-processor documents. Each school lays its grades table out a
//! little differently: Chinese or English headers, credit and grade in one
//! cell or two, long course names wrapped over several rows. This crate
//! reads the tables where they exist, falls back to OCR where they don't,
//! and applies one set of rules to decide what was passed and what it is
//! worth.
//!
//! ## Pipeline Overview
//!
//! ```text
//! transcript
//!  │
//!  ├─ 1. Input      read bytes, detect PDF vs .docx
//!  ├─ 2. Tables     ruled-line detection (pdfium) or native .docx tables
//!  ├─ 3. Normalise  rectangular rows, unique header names
//!  ├─ 4. Classify   keep tables whose header names credit/subject/grade
//!  ├─ 5. Aggregate  parse cells, stitch wrapped names, pass/fail, total
//!  └─ 6. OCR        only when step 4 found nothing in a PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transcript_credits::{process_file, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = process_file("transcript.pdf", None, ExtractionConfig::default()).await?;
//!     for course in &output.passed {
//!         println!("{} {} {} ({})", course.academic_year, course.subject_name,
//!             course.credit, course.grade_token);
//!     }
//!     println!("total: {}", output.total_credits);
//!     eprintln!("missing: {}", output.credit_shortfall(128.0));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `transcript-credits` binary (clap + anyhow + indicatif + tracing-subscriber) |
//! | `tesseract` | off     | Built-in Tesseract OCR fallback via `leptess` (needs libtesseract + libleptonica) |
//!
//! Without `tesseract` the OCR fallback only runs when a
//! [`TextRecognizer`] is supplied through
//! [`ExtractionConfigBuilder::recognizer`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ClassifierProfile, ColumnKeywords, ColumnRole, ExtractionConfig, ExtractionConfigBuilder,
    TableSettings,
};
pub use error::{OcrError, PageError, TranscriptError};
pub use output::{write_csv_file, CourseRecord, PipelineOutput, RecordList};
pub use pipeline::cell::{parse_credit_and_grade, ParseResult};
pub use pipeline::classify::looks_like_grades_table;
pub use pipeline::grade::is_passing;
pub use pipeline::input::DocumentKind;
pub use pipeline::normalize::normalize;
pub use pipeline::ocr::{parse_course_lines, TextRecognizer};
pub use pipeline::table::NormalizedTable;
pub use process::{
    extract_tables, process, process_bytes, process_file, process_file_sync, recognize,
};
pub use progress::{CancelToken, ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};

#[cfg(feature = "tesseract")]
pub use pipeline::ocr::TesseractRecognizer;
