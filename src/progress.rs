//! Progress-callback trait and cancellation for extraction runs.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the document's pages.
//!
//! # Why callbacks instead of channels?
//!
//! Callers can forward events to a terminal progress bar, a log, or a
//! channel of their own without the library knowing how the host
//! application communicates. The trait is `Send + Sync` because the pipeline
//! runs on a blocking worker thread.
//!
//! # Example
//!
//! ```rust
//! use transcript_credits::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct TableCounter(AtomicUsize);
//!
//! impl ExtractionProgressCallback for TableCounter {
//!     fn on_page_tables(&self, _page_num: usize, _total_pages: usize, found: usize) {
//!         self.0.fetch_add(found, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(TableCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Called by the pipeline as it processes a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Page numbers are 1-indexed.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the document is opened.
    ///
    /// # Arguments
    /// * `total_pages` — pages in a PDF; `0` for word-processor documents
    fn on_document_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after table detection on one PDF page.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `found`       — raw tables detected on the page
    fn on_page_tables(&self, page_num: usize, total_pages: usize, found: usize) {
        let _ = (page_num, total_pages, found);
    }

    /// Called when a page could not be processed; the run continues.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called when no grades table was found and OCR takes over.
    fn on_ocr_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after one page has been recognised.
    ///
    /// # Arguments
    /// * `lines` — text lines the recognizer returned for the page
    fn on_ocr_page_complete(&self, page_num: usize, total_pages: usize, lines: usize) {
        let _ = (page_num, total_pages, lines);
    }

    /// Called once with the final tallies.
    fn on_complete(&self, passed: usize, failed: usize, total_credits: f64) {
        let _ = (passed, failed, total_credits);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

/// Shared flag that stops page-by-page work early.
///
/// Clones share the same flag. Cancellation is observed between pages;
/// records already produced are kept.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
