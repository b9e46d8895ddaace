//! Pipeline stages for transcript credit extraction.
//!
//! Each submodule implements one transformation step. The pure stages
//! (everything except [`pdf`]) take plain values and are tested without a
//! PDF engine or OCR install.
//!
//! ## Data Flow
//!
//! ```text
//!                      ┌─ pdf ─▶ lines ─┐
//! input ──▶ (bytes) ───┤                ├─▶ table ─▶ classify ─▶ aggregate
//!                      └─ docx ─────────┘                ▲
//!                                     no grades table?  │
//!                      pdf (render) ─▶ ocr ──────────────┘ (records)
//! ```
//!
//! 1. [`input`]     — read the file and decide PDF vs word-processor document
//! 2. [`pdf`]       — page characters and ruling edges via pdfium; page rasters
//! 3. [`lines`]     — ruled-line table detection on page geometry
//! 4. [`docx`]      — native tables from `word/document.xml`
//! 5. [`table`]     — normalised, rectangular tables with unique headers
//! 6. [`classify`]  — which tables are grades tables; which column is which
//! 7. [`aggregate`] — rows → passed/failed records and the credit total
//! 8. [`ocr`]       — fallback when no grades table exists
//!
//! [`normalize`], [`cell`] and [`grade`] are the text rules shared by the
//! stages; [`encode`] turns page rasters into PNG for the OCR engine.

pub mod aggregate;
pub mod cell;
pub mod classify;
pub mod docx;
pub mod encode;
pub mod grade;
pub mod input;
pub mod lines;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod table;
