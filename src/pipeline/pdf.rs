//! PDF access through pdfium: page geometry for table detection and page
//! rasters for OCR.
//!
//! ## Coordinates
//!
//! pdfium reports positions in PDF points with a bottom-left origin. The
//! table detector works top-down, so every box is flipped with the page
//! height on the way out.
//!
//! ## Ruling lines
//!
//! Table rules are read from path objects segment by segment, so a whole
//! grid drawn as one path still yields every rule. A path whose segments
//! cannot be read contributes its bounding box instead: a thin box is one
//! rule, a larger one is a rectangle with four sides.

use super::lines::{self, BBox, PageChar, PageLayout, PathStep};
use super::ocr::{self, TextRecognizer};
use super::table::RawTable;
use crate::config::ExtractionConfig;
use crate::error::{PageError, TranscriptError};
use crate::output::CourseRecord;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// How far into the file the `%PDF` marker may appear.
const HEADER_SEARCH_BYTES: usize = 1024;

/// True when the `%PDF` marker appears near the start, as readers require.
pub fn has_pdf_header(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SEARCH_BYTES)];
    head.windows(4).any(|w| w == b"%PDF")
}

/// Bind to a pdfium library.
///
/// An explicit path may name the library file or the directory holding it.
/// Without one, the working directory is tried first and then the system
/// library path.
pub fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, TranscriptError> {
    let bindings = match library_path {
        Some(path) if path.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
        }
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| TranscriptError::PdfiumBindingFailed(format!("{:?}", e)))?;

    debug!("pdfium bound");
    Ok(Pdfium::new(bindings))
}

fn open<'a>(pdfium: &'a Pdfium, bytes: &'a [u8], config: &ExtractionConfig) -> Option<PdfDocument<'a>> {
    match pdfium.load_pdf_from_byte_slice(bytes, config.password.as_deref()) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!("Could not open PDF: {:?}", e);
            None
        }
    }
}

/// Detect ruled tables on every page.
///
/// A page that cannot be read is reported and skipped; a document that
/// cannot be opened yields no tables.
pub fn extract_tables(pdfium: &Pdfium, bytes: &[u8], config: &ExtractionConfig) -> Vec<RawTable> {
    let Some(document) = open(pdfium, bytes, config) else {
        return Vec::new();
    };
    let progress = config.progress();
    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);
    progress.on_document_start(total_pages);

    let mut tables = Vec::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        match page_layout(&page) {
            Ok(layout) => {
                let found = lines::find_tables(&layout, &config.table);
                debug!(
                    "Page {}: {} chars, {} edges → {} tables",
                    page_num,
                    layout.chars.len(),
                    layout.edges.len(),
                    found.len()
                );
                progress.on_page_tables(page_num, total_pages, found.len());
                tables.extend(found);
            }
            Err(detail) => {
                let err = PageError::TableDetectionFailed {
                    page: page_num,
                    detail,
                };
                warn!("{}", err);
                progress.on_page_error(page_num, total_pages, &err.to_string());
            }
        }
    }
    tables
}

/// Characters and ruling edges of one page, top-left origin.
fn page_layout(page: &PdfPage) -> Result<PageLayout, String> {
    let height = page.height().value;
    let flip = |left: f32, top: f32, right: f32, bottom: f32| {
        BBox::new(left, height - top, right, height - bottom)
    };

    let text = page.text().map_err(|e| format!("text layer: {:?}", e))?;
    let mut chars = Vec::new();
    for c in text.chars().iter() {
        let Some(ch) = c.unicode_char() else {
            continue;
        };
        if ch.is_whitespace() || ch.is_control() {
            continue;
        }
        let Ok(b) = c.loose_bounds() else {
            continue;
        };
        chars.push(PageChar {
            text: ch,
            bbox: flip(b.left().value, b.top().value, b.right().value, b.bottom().value),
        });
    }

    let mut edges = Vec::new();
    for object in page.objects().iter() {
        let Some(path) = object.as_path_object() else {
            continue;
        };
        let steps = path_steps(path, height);
        if !steps.is_empty() {
            edges.extend(lines::edges_from_path(&steps));
            continue;
        }
        // No readable segments: fall back to the drawn bounds.
        let Ok(b) = object.bounds() else {
            continue;
        };
        edges.extend(lines::edges_from_bbox(flip(
            b.left().value,
            b.top().value,
            b.right().value,
            b.bottom().value,
        )));
    }

    Ok(PageLayout { chars, edges })
}

/// Segments of a path object in page space, top-left origin.
fn path_steps(path: &PdfPagePathObject, height: f32) -> Vec<PathStep> {
    let Ok(matrix) = path.matrix() else {
        return Vec::new();
    };
    let segments = path.segments().transform(matrix);

    let mut steps = Vec::new();
    for index in 0..segments.len() {
        let Ok(segment) = segments.get(index) else {
            continue;
        };
        let (x, y) = segment.point();
        let (x, y) = (x.value, height - y.value);
        match segment.segment_type() {
            PdfPathSegmentType::MoveTo => steps.push(PathStep::MoveTo(x, y)),
            PdfPathSegmentType::LineTo => steps.push(PathStep::LineTo(x, y)),
            PdfPathSegmentType::BezierTo => steps.push(PathStep::CurveTo(x, y)),
            PdfPathSegmentType::Unknown => continue,
        }
        if segment.is_close() {
            steps.push(PathStep::Close);
        }
    }
    steps
}

/// Rasterise every page at `config.ocr_scale` and run the OCR fallback.
///
/// Pages are rendered lazily, one at a time, so cancellation also stops
/// rendering.
pub fn ocr_document(
    pdfium: &Pdfium,
    bytes: &[u8],
    recognizer: &dyn TextRecognizer,
    config: &ExtractionConfig,
) -> Vec<CourseRecord> {
    let Some(document) = open(pdfium, bytes, config) else {
        return Vec::new();
    };
    let pages = document.pages();
    let total_pages = pages.len() as usize;
    config.progress().on_ocr_start(total_pages);
    info!(
        "OCR fallback: {} pages at {}× scale, languages {}",
        total_pages,
        config.ocr_scale,
        config.ocr_language_spec()
    );

    let render_config = PdfRenderConfig::new().scale_page_by_factor(config.ocr_scale);
    let images = pages
        .iter()
        .enumerate()
        .map(|(idx, page)| -> Result<DynamicImage, PageError> {
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| PageError::RenderFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;
            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            Ok(image)
        });

    ocr::recognize_pages(images, total_pages, recognizer, config)
}
