//! Word-processor tables: `.docx` bytes → raw tables.
//!
//! A `.docx` is a zip archive whose body lives in `word/document.xml`
//! (WordprocessingML). The body is streamed with `quick-xml`; every top-level
//! `<w:tbl>` becomes one raw table.
//!
//! Merged cells are expanded the way word-processor libraries report them:
//! a cell spanning N grid columns (`<w:gridSpan w:val="N"/>`) repeats its
//! text N times, and a vertical-merge continuation (`<w:vMerge/>` without
//! `w:val="restart"`) repeats the text of the cell above. Nested tables are
//! flattened into the text of the cell that holds them.

use super::table::RawTable;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Tables with fewer rows cannot hold a header plus data.
pub const MIN_TABLE_ROWS: usize = 2;

#[derive(Debug, Error)]
enum DocxError {
    #[error("not a zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("reading word/document.xml: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed word/document.xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Every table with at least [`MIN_TABLE_ROWS`] rows, in document order.
///
/// An unreadable document yields no tables.
pub fn extract_tables(bytes: &[u8]) -> Vec<RawTable> {
    match read_tables(bytes) {
        Ok(tables) => {
            debug!("Word-processor document: {} tables", tables.len());
            tables
        }
        Err(e) => {
            warn!("Could not read word-processor document: {}", e);
            Vec::new()
        }
    }
}

fn read_tables(bytes: &[u8]) -> Result<Vec<RawTable>, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    Ok(parse_document_xml(&xml)?
        .into_iter()
        .filter(|t| t.len() >= MIN_TABLE_ROWS)
        .collect())
}

/// Extract all top-level tables from WordprocessingML, without row filtering.
pub fn parse_document_xml(xml: &str) -> Result<Vec<RawTable>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut walker = BodyWalker::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => walker.open(&e, false),
            Event::Empty(e) => walker.open(&e, true),
            Event::End(e) => walker.close(e.name().as_ref()),
            Event::Text(t) => {
                if walker.in_text {
                    walker.text(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(walker.tables)
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

#[derive(Debug, Default)]
struct CellBuilder {
    text: String,
    span: usize,
    /// `Some(true)` starts a vertical merge, `Some(false)` continues one.
    v_merge: Option<bool>,
}

#[derive(Debug, Default)]
struct BodyWalker {
    tables: Vec<RawTable>,
    /// Nesting level of `<w:tbl>`; only level 1 builds rows and cells.
    depth: usize,
    rows: Vec<Vec<CellBuilder>>,
    row: Vec<CellBuilder>,
    cell: Option<CellBuilder>,
    in_text: bool,
}

impl BodyWalker {
    fn open(&mut self, e: &BytesStart, empty: bool) {
        let top = self.depth == 1;
        match e.name().as_ref() {
            b"w:tbl" if !empty => {
                self.depth += 1;
                if self.depth == 1 {
                    self.rows.clear();
                }
            }
            b"w:tr" if top && !empty => self.row.clear(),
            b"w:tc" if top && !empty => {
                self.cell = Some(CellBuilder {
                    span: 1,
                    ..CellBuilder::default()
                })
            }
            b"w:t" if !empty => self.in_text = true,
            b"w:tab" => self.text("\t"),
            b"w:br" | b"w:cr" => self.text("\n"),
            b"w:gridSpan" if top => {
                if let (Some(cell), Some(span)) = (
                    self.cell.as_mut(),
                    attr(e, b"w:val").and_then(|v| v.parse::<usize>().ok()),
                ) {
                    cell.span = span.max(1);
                }
            }
            b"w:vMerge" if top => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.v_merge = Some(attr(e, b"w:val").as_deref() == Some("restart"));
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        let top = self.depth == 1;
        match name {
            b"w:t" => self.in_text = false,
            b"w:p" => self.text("\n"),
            b"w:tc" if top => {
                if let Some(mut cell) = self.cell.take() {
                    let trimmed = cell.text.trim_end_matches('\n').len();
                    cell.text.truncate(trimmed);
                    self.row.push(cell);
                }
            }
            b"w:tr" if top => {
                let row = std::mem::take(&mut self.row);
                self.rows.push(row);
            }
            b"w:tbl" if self.depth > 0 => {
                if top {
                    let rows = std::mem::take(&mut self.rows);
                    self.tables.push(expand_merges(rows));
                }
                self.depth -= 1;
            }
            _ => {}
        }
    }

    fn text(&mut self, s: &str) {
        if let Some(cell) = self.cell.as_mut() {
            cell.text.push_str(s);
        }
    }
}

/// Lay cells out on the grid, repeating spanned and vertically merged text.
fn expand_merges(rows: Vec<Vec<CellBuilder>>) -> RawTable {
    let mut out: RawTable = Vec::with_capacity(rows.len());
    for row in rows {
        let mut grid: Vec<Option<String>> = Vec::new();
        for cell in row {
            let text = if cell.v_merge == Some(false) {
                let col = grid.len();
                out.last()
                    .and_then(|above| above.get(col).cloned().flatten())
                    .unwrap_or_default()
            } else {
                cell.text
            };
            for _ in 0..cell.span {
                grid.push(Some(text.clone()));
            }
        }
        out.push(grid);
    }
    out
}
