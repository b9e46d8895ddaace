//! Extraction entry points.
//!
//! [`process_bytes`] is the synchronous core; [`process`] and
//! [`process_file`] run it on tokio's blocking pool because pdfium and
//! Tesseract are blocking C libraries.
//!
//! ## Failure policy
//!
//! Only environment problems are errors (unreadable file, pdfium missing).
//! A corrupt document, a page that cannot be read, a table without usable
//! columns or an OCR engine failure all degrade to fewer records, at worst
//! an empty [`PipelineOutput`].

use crate::config::ExtractionConfig;
use crate::error::TranscriptError;
use crate::output::{CourseRecord, PipelineOutput};
use crate::pipeline::aggregate::{aggregate, Tally};
use crate::pipeline::classify::looks_like_grades_table;
use crate::pipeline::input::{resolve_input, DocumentKind};
use crate::pipeline::table::{NormalizedTable, RawTable};
use crate::pipeline::{docx, ocr, pdf};
use pdfium_render::prelude::Pdfium;
use std::path::Path;
use tracing::{debug, info, warn};

/// Extract course records from an in-memory document.
///
/// # Errors
/// Returns `Err` only when a PDF needs pdfium and the library cannot be
/// bound. Everything else yields `Ok`, possibly empty.
///
/// # Example
/// ```rust
/// use transcript_credits::{process_bytes, DocumentKind, ExtractionConfig};
///
/// let output = process_bytes(b"not a document", DocumentKind::Pdf, &ExtractionConfig::default())
///     .unwrap();
/// assert_eq!(output.total_credits, 0.0);
/// assert!(output.is_empty());
/// ```
pub fn process_bytes(
    bytes: &[u8],
    kind: DocumentKind,
    config: &ExtractionConfig,
) -> Result<PipelineOutput, TranscriptError> {
    info!("Processing {} bytes as {}", bytes.len(), kind);

    let output = match kind {
        DocumentKind::TableDocument => {
            let tables = grades_tables(docx_tables(bytes, config), config);
            aggregate(&tables, &config.keywords)
        }
        DocumentKind::Pdf => process_pdf(bytes, config)?,
    };

    info!(
        "Done: {} passed, {} failed, {} credits",
        output.passed.len(),
        output.failed.len(),
        output.total_credits
    );
    config
        .progress()
        .on_complete(output.passed.len(), output.failed.len(), output.total_credits);
    Ok(output)
}

fn process_pdf(bytes: &[u8], config: &ExtractionConfig) -> Result<PipelineOutput, TranscriptError> {
    if !pdf::has_pdf_header(bytes) {
        warn!("No %PDF header; nothing to extract");
        return Ok(PipelineOutput::default());
    }

    let pdfium = pdf::bind_pdfium(config.pdfium_library_path.as_deref())?;

    let tables = grades_tables(pdf_tables(&pdfium, bytes, config), config);
    if !tables.is_empty() {
        return Ok(aggregate(&tables, &config.keywords));
    }

    if !config.ocr_enabled {
        info!("No grades table found and OCR is disabled");
        return Ok(PipelineOutput::default());
    }
    info!("No grades table found, falling back to OCR");

    let mut tally = Tally::new();
    for record in ocr_fallback(&pdfium, bytes, config) {
        tally.push(record);
    }
    Ok(tally.finish())
}

/// Every table in the document, normalised, in document order.
///
/// Tables are not filtered by [`looks_like_grades_table`]. A document that
/// cannot be read yields no tables.
///
/// # Errors
/// Only a PDF whose pdfium library cannot be bound.
pub fn extract_tables(
    bytes: &[u8],
    kind: DocumentKind,
    config: &ExtractionConfig,
) -> Result<Vec<NormalizedTable>, TranscriptError> {
    match kind {
        DocumentKind::TableDocument => Ok(docx_tables(bytes, config)),
        DocumentKind::Pdf => {
            if !pdf::has_pdf_header(bytes) {
                warn!("No %PDF header; nothing to extract");
                return Ok(Vec::new());
            }
            let pdfium = pdf::bind_pdfium(config.pdfium_library_path.as_deref())?;
            Ok(pdf_tables(&pdfium, bytes, config))
        }
    }
}

/// Run only the OCR path on a PDF, whether or not it has grades tables.
///
/// Records come back in page order and are not yet split into passed and
/// failed. No recognizer, a recognizer failure or an unreadable document all
/// give an empty list.
///
/// # Errors
/// Only when the pdfium library cannot be bound.
pub fn recognize(bytes: &[u8], config: &ExtractionConfig) -> Result<Vec<CourseRecord>, TranscriptError> {
    if !pdf::has_pdf_header(bytes) {
        warn!("No %PDF header; nothing to recognise");
        return Ok(Vec::new());
    }
    let pdfium = pdf::bind_pdfium(config.pdfium_library_path.as_deref())?;
    Ok(ocr_fallback(&pdfium, bytes, config))
}

fn ocr_fallback(pdfium: &Pdfium, bytes: &[u8], config: &ExtractionConfig) -> Vec<CourseRecord> {
    match ocr::resolve_recognizer(config) {
        Ok(recognizer) => pdf::ocr_document(pdfium, bytes, recognizer.as_ref(), config),
        Err(e) => {
            warn!("OCR is unavailable: {}", e);
            Vec::new()
        }
    }
}

fn docx_tables(bytes: &[u8], config: &ExtractionConfig) -> Vec<NormalizedTable> {
    config.progress().on_document_start(0);
    normalise_all(docx::extract_tables(bytes))
}

fn pdf_tables(pdfium: &Pdfium, bytes: &[u8], config: &ExtractionConfig) -> Vec<NormalizedTable> {
    normalise_all(pdf::extract_tables(pdfium, bytes, config))
}

fn normalise_all(raw: Vec<RawTable>) -> Vec<NormalizedTable> {
    raw.into_iter()
        .filter_map(NormalizedTable::from_raw_rows)
        .collect()
}

/// Keep the tables that look like grades tables.
fn grades_tables(tables: Vec<NormalizedTable>, config: &ExtractionConfig) -> Vec<NormalizedTable> {
    let found = tables.len();
    let tables: Vec<NormalizedTable> = tables
        .into_iter()
        .filter(|t| {
            let keep = looks_like_grades_table(t, &config.keywords, config.profile);
            if !keep {
                debug!("Not a grades table: {:?}", t.header());
            }
            keep
        })
        .collect();
    info!("{} of {} tables are grades tables", tables.len(), found);
    tables
}

/// Async wrapper around [`process_bytes`] on the blocking thread pool.
pub async fn process(
    bytes: Vec<u8>,
    kind: DocumentKind,
    config: ExtractionConfig,
) -> Result<PipelineOutput, TranscriptError> {
    tokio::task::spawn_blocking(move || process_bytes(&bytes, kind, &config))
        .await
        .map_err(|e| TranscriptError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Read a transcript file and process it.
///
/// `kind` overrides detection from the extension and magic bytes.
///
/// # Errors
/// Besides the errors of [`process_bytes`]: file not found, permission
/// denied, or a document that is neither PDF nor `.docx`.
pub async fn process_file(
    path: impl AsRef<Path>,
    kind: Option<DocumentKind>,
    config: ExtractionConfig,
) -> Result<PipelineOutput, TranscriptError> {
    let (bytes, kind) = resolve_input(path.as_ref(), kind)?;
    process(bytes, kind, config).await
}

/// Synchronous wrapper around [`process_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_file_sync(
    path: impl AsRef<Path>,
    kind: Option<DocumentKind>,
    config: ExtractionConfig,
) -> Result<PipelineOutput, TranscriptError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranscriptError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_file(path, kind, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupted_pdf_bytes_are_empty() {
        let out = process_bytes(&[0xde, 0xad, 0xbe, 0xef], DocumentKind::Pdf, &ExtractionConfig::default())
            .unwrap();
        assert_eq!(out, PipelineOutput::default());
    }

    #[test]
    fn corrupted_docx_bytes_are_empty() {
        let out = process_bytes(b"PK\x03\x04garbage", DocumentKind::TableDocument, &ExtractionConfig::default())
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(out.total_credits, 0.0);
    }

    #[test]
    fn async_wrapper_runs_on_blocking_pool() {
        let out = tokio_test::block_on(process(
            b"garbage".to_vec(),
            DocumentKind::Pdf,
            ExtractionConfig::default(),
        ))
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn tables_of_unreadable_documents_are_empty() {
        let config = ExtractionConfig::default();
        assert!(extract_tables(b"garbage", DocumentKind::Pdf, &config).unwrap().is_empty());
        assert!(extract_tables(b"garbage", DocumentKind::TableDocument, &config)
            .unwrap()
            .is_empty());
        assert!(recognize(b"garbage", &config).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = process_file_sync("/nonexistent/transcript.pdf", None, ExtractionConfig::default())
            .unwrap_err();
        assert!(matches!(err, TranscriptError::FileNotFound { .. }));
    }
}
