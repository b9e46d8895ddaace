//! OCR fallback: page images in, course records out.
//!
//! Used only when a PDF has no detectable grades table (scanned transcripts,
//! or generators that draw text without ruling lines).
//!
//! ## Stages
//!
//! ```text
//! page images ──▶ TextRecognizer ──▶ merge_wrapped_lines ──▶ parse_course_lines
//!                 (image → lines)    (join wrapped names)    (lines → records)
//! ```
//!
//! The recognizer is a narrow trait so the grammar can be tested with canned
//! lines and so callers can plug in a different engine. The built-in engine
//! is Tesseract (`tesseract` cargo feature).

use super::normalize::{normalize, parse_decimal};
use crate::config::ExtractionConfig;
use crate::error::{OcrError, PageError};
use crate::output::CourseRecord;
use image::DynamicImage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns one page image into its text lines, top to bottom.
pub trait TextRecognizer: Send + Sync {
    /// # Arguments
    /// * `page_num` — 1-indexed page number, for error reporting
    /// * `image`    — the rasterised page
    fn recognize(&self, page_num: usize, image: &DynamicImage) -> Result<Vec<String>, OcrError>;
}

/// A line that ends a course entry: `… <credit> <grade>`.
static RE_TERMINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+\s+\d+(?:\.\d+)?\s+(?:[A-F][+\-]?|通過|抵免)$").unwrap());

/// `<year> <term> <subject> <credit> <grade>`.
static RE_COURSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{3,4})\s*(上|下|春|夏|秋|冬)\s+(.+?)\s+(\d+(?:\.\d+)?)\s+([A-F][+\-]?|通過|抵免)$")
        .unwrap()
});

/// Join lines that a long subject name split across.
///
/// Non-terminal lines accumulate in a buffer which is prefixed to the next
/// line; once the combined text is terminal it is emitted. Whatever is still
/// buffered at the end is dropped.
pub fn merge_wrapped_lines(lines: &[String]) -> Vec<String> {
    let mut merged = Vec::new();
    let mut buffer = String::new();

    for line in lines {
        let line = if buffer.is_empty() {
            line.clone()
        } else {
            format!("{} {}", std::mem::take(&mut buffer), line)
        };
        if RE_TERMINAL.is_match(&line) {
            merged.push(line);
        } else {
            buffer = line;
        }
    }

    if !buffer.is_empty() {
        debug!("OCR: dropping unterminated text {:?}", buffer);
    }
    merged
}

/// Parse one merged line. Source table index is always 0.
pub fn parse_course_line(line: &str) -> Option<CourseRecord> {
    let caps = RE_COURSE.captures(line)?;
    let credit = parse_decimal(&caps[4])?;
    Some(CourseRecord {
        academic_year: caps[1].to_string(),
        semester: caps[2].to_string(),
        subject_name: normalize(&caps[3]),
        credit,
        grade_token: caps[5].to_string(),
        source_table_index: 0,
    })
}

/// Parse every merged line, logging and skipping the ones that don't fit.
pub fn parse_course_lines(lines: &[String]) -> Vec<CourseRecord> {
    lines
        .iter()
        .filter_map(|line| {
            let record = parse_course_line(line);
            if record.is_none() {
                debug!("OCR: unmatched line {:?}", line);
            }
            record
        })
        .collect()
}

/// Recognise rendered pages one by one and parse the result.
///
/// Cancellation is checked before each page is pulled from `pages`, so no
/// page is rendered after cancelling. Pages that failed to render are
/// skipped. A recognizer error abandons the whole fallback.
pub fn recognize_pages<I>(
    pages: I,
    total_pages: usize,
    recognizer: &dyn TextRecognizer,
    config: &ExtractionConfig,
) -> Vec<CourseRecord>
where
    I: IntoIterator<Item = Result<DynamicImage, PageError>>,
{
    let progress = config.progress();
    let mut pages = pages.into_iter();
    let mut lines: Vec<String> = Vec::new();
    let mut page_num = 0usize;

    loop {
        if config.cancel.is_cancelled() {
            info!("OCR cancelled after {} of {} pages", page_num, total_pages);
            break;
        }
        let Some(page) = pages.next() else {
            break;
        };
        page_num += 1;

        let image = match page {
            Ok(image) => image,
            Err(e) => {
                warn!("{}", e);
                progress.on_page_error(page_num, total_pages, &e.to_string());
                continue;
            }
        };

        match recognizer.recognize(page_num, &image) {
            Ok(page_lines) => {
                debug!("OCR page {}: {} lines", page_num, page_lines.len());
                progress.on_ocr_page_complete(page_num, total_pages, page_lines.len());
                lines.extend(
                    page_lines
                        .iter()
                        .map(|l| normalize(l))
                        .filter(|l| !l.is_empty()),
                );
            }
            Err(e) => {
                warn!("OCR abandoned: {}", e);
                return Vec::new();
            }
        }
    }

    if lines.is_empty() {
        warn!("OCR recognised no text");
        return Vec::new();
    }

    let records = parse_course_lines(&merge_wrapped_lines(&lines));
    if records.is_empty() {
        warn!("OCR found text but no course lines");
    } else {
        info!("OCR parsed {} courses", records.len());
    }
    records
}

/// The recognizer to use: the injected one, else the built-in engine.
pub fn resolve_recognizer(config: &ExtractionConfig) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    if let Some(recognizer) = &config.recognizer {
        return Ok(Arc::clone(recognizer));
    }
    default_recognizer(config)
}

#[cfg(feature = "tesseract")]
fn default_recognizer(config: &ExtractionConfig) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    Ok(Arc::new(TesseractRecognizer::new(config.ocr_language_spec())?))
}

#[cfg(not(feature = "tesseract"))]
fn default_recognizer(_config: &ExtractionConfig) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    Err(OcrError::EngineUnavailable(
        "built without the `tesseract` feature and no recognizer was supplied".into(),
    ))
}

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "tesseract")]
mod tesseract {
    use super::TextRecognizer;
    use crate::error::OcrError;
    use crate::pipeline::encode::encode_png;
    use image::DynamicImage;
    use leptess::LepTess;

    /// Tesseract through `leptess`. A fresh engine is created per page.
    #[derive(Debug, Clone)]
    pub struct TesseractRecognizer {
        language: String,
    }

    impl TesseractRecognizer {
        /// Probe that Tesseract starts with `language` (e.g. `chi_tra+eng`).
        pub fn new(language: impl Into<String>) -> Result<Self, OcrError> {
            let language = language.into();
            LepTess::new(None, &language).map_err(|e| {
                OcrError::EngineUnavailable(format!(
                    "Tesseract could not load '{}': {}. Install the language data \
                     (e.g. tesseract-ocr-chi-tra)",
                    language, e
                ))
            })?;
            Ok(Self { language })
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize(&self, page_num: usize, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
            let failed = |detail: String| OcrError::RecognitionFailed {
                page: page_num,
                detail,
            };

            let mut lt = LepTess::new(None, &self.language)
                .map_err(|e| OcrError::EngineUnavailable(e.to_string()))?;
            let png = encode_png(image).map_err(|e| failed(e.to_string()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| failed(format!("set image: {e}")))?;
            let text = lt.get_utf8_text().map_err(|e| failed(e.to_string()))?;

            Ok(text.lines().map(str::to_string).collect())
        }
    }
}
