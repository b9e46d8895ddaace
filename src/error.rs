//! Error types for the transcript-credits library.
//!
//! Three distinct error types reflect three distinct failure modes:
//!
//! * [`TranscriptError`] — **Fatal**: the environment is wrong (file missing,
//!   pdfium library cannot be bound, output file not writable). Returned as
//!   `Err(TranscriptError)` from the top-level `process*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page could not be analysed
//!   (table detection or rasterisation glitch). Logged and forwarded to the
//!   progress callback; the remaining pages are still processed.
//!
//! * [`OcrError`] — the text recognition engine failed. The OCR fallback
//!   turns this into an empty result rather than propagating it.
//!
//! Data-quality problems (corrupt documents, unparseable rows, tables with
//! no usable columns) are never errors: they degrade to an empty
//! [`crate::output::PipelineOutput`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the transcript-credits library.
#[derive(Debug, Error)]
pub enum TranscriptError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Transcript file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Neither the extension nor the leading bytes identify a PDF or DOCX.
    #[error("Unsupported document '{path}': expected a .pdf or .docx file")]
    UnsupportedDocument { path: PathBuf },

    /// Reading the input failed for a reason other than the ones above.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide, or point\n\
--pdfium-lib / TRANSCRIPT_PDFIUM_LIB at the directory that contains it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write a CSV export.
    #[error("Failed to write CSV file '{path}': {source}")]
    CsvWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialisation failed while writing to an in-memory or caller sink.
    #[error("CSV serialisation failed: {0}")]
    Csv(#[from] csv::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Characters or ruling lines could not be read from the page.
    #[error("Page {page}: table detection failed: {detail}")]
    TableDetectionFailed { page: usize, detail: String },

    /// Page rasterisation for OCR failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },
}

/// Failure of the text recognition engine.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The engine could not be initialised (missing language data, library).
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine was initialised but failed on a page.
    #[error("OCR failed on page {page}: {detail}")]
    RecognitionFailed { page: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_error_display() {
        let e = PageError::TableDetectionFailed {
            page: 2,
            detail: "no text layer".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 2"), "got: {msg}");
        assert!(msg.contains("no text layer"));
    }

    #[test]
    fn ocr_error_display() {
        let e = OcrError::RecognitionFailed {
            page: 4,
            detail: "tesseract crashed".into(),
        };
        assert!(e.to_string().contains("page 4"));

        let e = OcrError::EngineUnavailable("chi_tra.traineddata missing".into());
        assert!(e.to_string().contains("chi_tra"));
    }

    #[test]
    fn pdfium_binding_display_mentions_flag() {
        let e = TranscriptError::PdfiumBindingFailed("dlopen failed".into());
        let msg = e.to_string();
        assert!(msg.contains("dlopen failed"));
        assert!(msg.contains("--pdfium-lib"));
    }

    #[test]
    fn unsupported_document_display() {
        let e = TranscriptError::UnsupportedDocument {
            path: PathBuf::from("grades.xlsx"),
        };
        assert!(e.to_string().contains("grades.xlsx"));
    }
}
