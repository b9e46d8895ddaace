//! Whole-pipeline tests on word-processor transcripts.
//!
//! Fixtures are `.docx` archives assembled in memory, so these run without
//! pdfium or an OCR engine.

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use transcript_credits::{
    is_passing, process_bytes, process_file, process_file_sync, write_csv_file,
    ClassifierProfile, ColumnKeywords, DocumentKind, ExtractionConfig,
    ExtractionProgressCallback, PipelineOutput, RecordList, TranscriptError,
};
use tracing_subscriber::EnvFilter;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// ── Fixture helpers ──────────────────────────────────────────────────────────

const GRADES_HEADER: [&str; 5] = ["學年", "學期", "課程名稱", "學分", "GPA"];

fn row_xml(cells: &[&str]) -> String {
    let cells: String = cells
        .iter()
        .map(|c| format!("<w:tc><w:p><w:r><w:t xml:space=\"preserve\">{c}</w:t></w:r></w:p></w:tc>"))
        .collect();
    format!("<w:tr>{cells}</w:tr>")
}

fn table_xml(rows: &[&[&str]]) -> String {
    let rows: String = rows.iter().map(|r| row_xml(r)).collect();
    format!("<w:tbl>{rows}</w:tbl>")
}

/// A `.docx` whose body is the given WordprocessingML fragment.
fn docx(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#,
    )
    .unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

fn grades_docx(rows: &[&[&str]]) -> Vec<u8> {
    let mut all: Vec<&[&str]> = Vec::with_capacity(rows.len() + 1);
    all.push(&GRADES_HEADER);
    all.extend_from_slice(rows);
    docx(&format!(
        "<w:p><w:r><w:t>歷年成績單</w:t></w:r></w:p>{}",
        table_xml(&all)
    ))
}

/// Route pipeline logs through the test harness.
/// `RUST_LOG=transcript_credits=debug cargo test -- --nocapture` shows them.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn run(bytes: &[u8]) -> PipelineOutput {
    init_logging();
    process_bytes(bytes, DocumentKind::TableDocument, &ExtractionConfig::default()).unwrap()
}

fn assert_invariants(out: &PipelineOutput) {
    let sum: f64 = out.passed.iter().map(|r| r.credit).filter(|c| *c > 0.0).sum();
    assert!((out.total_credits - sum).abs() < 1e-9);
    for r in &out.failed {
        assert!(!r.grade_token.is_empty() && !is_passing(&r.grade_token));
    }
    for r in &out.passed {
        assert!(r.grade_token.is_empty() || is_passing(&r.grade_token));
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn test_wrapped_subject_is_one_course() {
    let bytes = grades_docx(&[
        &["108", "上", "大一英文(一", "", ""],
        &["108", "上", "二)", "3", "B+"],
    ]);
    let out = run(&bytes);

    assert_eq!(out.passed.len(), 1);
    assert!(out.failed.is_empty());
    let course = &out.passed[0];
    assert_eq!(course.subject_name, "大一英文(一 二)");
    assert_eq!(course.credit, 3.0);
    assert_eq!(course.grade_token, "B+");
    assert_eq!(course.academic_year, "108");
    assert_eq!(course.semester, "上");
    assert_eq!(course.source_table_index, 1);
    assert_eq!(out.total_credits, 3.0);
}

#[test]
fn test_header_only_table_yields_nothing() {
    let out = run(&grades_docx(&[&["", "", "", "", ""]]));
    assert!(out.is_empty());
    assert_eq!(out.total_credits, 0.0);
}

#[test]
fn test_corrupted_bytes_yield_empty_output() {
    init_logging();
    for kind in [DocumentKind::Pdf, DocumentKind::TableDocument] {
        let out = process_bytes(b"\x00\x01garbage\xff", kind, &ExtractionConfig::default()).unwrap();
        assert_eq!(out, PipelineOutput::default(), "{kind}");
    }
}

#[test]
fn test_mixed_transcript() {
    let bytes = grades_docx(&[
        &["108", "上", "微積分", "3", "A"],
        &["108", "上", "普通物理", "3", "F"],
        &["108", "下", "體育", "0", "通過"],
        &["109", "上", "資料結構", "A 3", ""],
        &["109", "上", "英文寫作", "2", "58"],
        &["109", "下", "服務學習", "", "抵免"],
    ]);
    let out = run(&bytes);
    assert_invariants(&out);

    let passed: Vec<&str> = out.passed.iter().map(|r| r.subject_name.as_str()).collect();
    assert_eq!(passed, ["微積分", "體育", "資料結構", "服務學習"]);
    let failed: Vec<&str> = out.failed.iter().map(|r| r.subject_name.as_str()).collect();
    assert_eq!(failed, ["普通物理", "英文寫作"]);
    assert_eq!(out.total_credits, 6.0);

    let ds = &out.passed[2];
    assert_eq!(ds.credit, 3.0);
    assert_eq!(ds.grade_token, "A");
}

#[test]
fn test_non_grades_tables_are_ignored() {
    let contact: &[&[&str]] = &[&["姓名", "學號"], &["王小明", "B0912345"]];
    let grades: &[&[&str]] = &[&GRADES_HEADER, &["110", "上", "線性代數", "3", "B"]];
    let bytes = docx(&format!("{}{}", table_xml(contact), table_xml(grades)));

    let out = run(&bytes);
    assert_eq!(out.passed.len(), 1);
    assert_eq!(out.passed[0].subject_name, "線性代數");
    // Only grades tables are numbered.
    assert_eq!(out.passed[0].source_table_index, 1);
}

#[test]
fn test_strict_profile_needs_year_and_semester() {
    init_logging();
    let rows: &[&[&str]] = &[&["科目", "學分", "成績"], &["國文", "2", "A"]];
    let bytes = docx(&table_xml(rows));

    assert_eq!(run(&bytes).total_credits, 2.0);

    let strict = ExtractionConfig::builder()
        .profile(ClassifierProfile::Strict)
        .build()
        .unwrap();
    let out = process_bytes(&bytes, DocumentKind::TableDocument, &strict).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_custom_keywords() {
    init_logging();
    let rows: &[&[&str]] = &[&["Course Title", "Units", "Mark"], &["Algebra", "4", "A"]];
    let bytes = docx(&table_xml(rows));
    assert!(run(&bytes).is_empty());

    let keywords =
        ColumnKeywords::from_json(r#"{"credit": ["units"], "subject": ["course title"], "grade": ["mark"]}"#)
            .unwrap();
    let config = ExtractionConfig::builder().keywords(keywords).build().unwrap();
    let out = process_bytes(&bytes, DocumentKind::TableDocument, &config).unwrap();
    assert_eq!(out.passed.len(), 1);
    assert_eq!(out.passed[0].subject_name, "Algebra");
    assert_eq!(out.total_credits, 4.0);
}

// ── Progress and files ───────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    starts: AtomicUsize,
    completed: Mutex<Option<(usize, usize, f64)>>,
}

impl ExtractionProgressCallback for Recorder {
    fn on_document_start(&self, _total_pages: usize) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_complete(&self, passed: usize, failed: usize, total_credits: f64) {
        *self.completed.lock().unwrap() = Some((passed, failed, total_credits));
    }
}

#[test]
fn test_progress_callback_sees_final_tally() {
    init_logging();
    let recorder = Arc::new(Recorder::default());
    let config = ExtractionConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let bytes = grades_docx(&[&["108", "上", "微積分", "3", "A"], &["108", "上", "物理", "3", "E"]]);

    process_bytes(&bytes, DocumentKind::TableDocument, &config).unwrap();
    assert_eq!(recorder.starts.load(Ordering::SeqCst), 1);
    assert_eq!(*recorder.completed.lock().unwrap(), Some((1, 1, 3.0)));
}

#[test]
fn test_process_file_detects_docx() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    // No extension: the zip signature decides.
    let path = dir.path().join("transcript");
    std::fs::write(&path, grades_docx(&[&["108", "上", "微積分", "3", "A"]])).unwrap();

    let out = process_file_sync(&path, None, ExtractionConfig::default()).unwrap();
    assert_eq!(out.total_credits, 3.0);

    let out = tokio_test::block_on(process_file(
        &path,
        Some(DocumentKind::TableDocument),
        ExtractionConfig::default(),
    ))
    .unwrap();
    assert_eq!(out.passed.len(), 1);
}

#[test]
fn test_unknown_file_kind_is_an_error() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "108 上 微積分 3 A").unwrap();

    let err = process_file_sync(&path, None, ExtractionConfig::default()).unwrap_err();
    assert!(matches!(err, TranscriptError::UnsupportedDocument { .. }));
}

#[test]
fn test_csv_export_of_both_lists() {
    let out = run(&grades_docx(&[
        &["108", "上", "微積分", "3", "A"],
        &["108", "下", "物理, 實驗", "1", "F"],
    ]));
    let dir = tempfile::tempdir().unwrap();
    let passed = dir.path().join("passed.csv");
    let failed = dir.path().join("failed.csv");

    write_csv_file(&out, RecordList::Passed, &passed).unwrap();
    write_csv_file(&out, RecordList::Failed, &failed).unwrap();

    let passed = std::fs::read_to_string(passed).unwrap();
    assert!(passed.starts_with('\u{FEFF}'));
    let mut lines = passed.trim_start_matches('\u{FEFF}').lines();
    assert_eq!(
        lines.next(),
        Some("academic_year,semester,subject_name,credit,grade_token")
    );
    assert_eq!(lines.next(), Some("108,上,微積分,3.0,A"));
    assert_eq!(lines.next(), None);

    let failed = std::fs::read_to_string(failed).unwrap();
    let mut lines = failed.trim_start_matches('\u{FEFF}').lines();
    assert_eq!(
        lines.next(),
        Some("academic_year,semester,subject_name,credit,grade_token,source_table_index")
    );
    assert_eq!(lines.next(), Some("108,下,\"物理, 實驗\",1.0,F,1"));
}
