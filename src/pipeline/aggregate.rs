//! Credit aggregation: grades tables in, passed/failed records and a total out.
//!
//! Rows are read through the cell parser and grade classifier. Subject names
//! that wrap onto several table rows are stitched back together with a
//! single-row lookback buffer: a row that carries neither a credit nor a
//! passing grade is assumed to be the head of the next complete row's name.

use super::cell::{is_pass_vocabulary, parse_credit_and_grade};
use super::classify::ColumnMap;
use super::grade::is_passing;
use super::normalize::normalize;
use super::table::NormalizedTable;
use crate::config::ColumnKeywords;
use crate::output::{CourseRecord, PipelineOutput};
use tracing::debug;

/// Running totals shared by table aggregation and OCR record collection.
#[derive(Debug, Default)]
pub struct Tally {
    output: PipelineOutput,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a complete record under passed or failed.
    ///
    /// A non-empty grade that is not passing is a failure; everything else
    /// counts as passed and adds its positive credit to the total.
    pub fn push(&mut self, record: CourseRecord) {
        let failed = !record.grade_token.is_empty() && !is_passing(&record.grade_token);
        if failed {
            self.output.failed.push(record);
        } else {
            if record.credit > 0.0 {
                self.output.total_credits += record.credit;
            }
            self.output.passed.push(record);
        }
    }

    pub fn finish(self) -> PipelineOutput {
        self.output
    }
}

/// Aggregate every table, numbering them from 1 in the given order.
pub fn aggregate(tables: &[NormalizedTable], keywords: &ColumnKeywords) -> PipelineOutput {
    let mut tally = Tally::new();
    for (i, table) in tables.iter().enumerate() {
        aggregate_table(table, i + 1, keywords, &mut tally);
    }
    tally.finish()
}

fn aggregate_table(
    table: &NormalizedTable,
    table_index: usize,
    keywords: &ColumnKeywords,
    tally: &mut Tally,
) {
    let columns = ColumnMap::resolve(table.header(), keywords);
    let (Some(credit_col), Some(subject_col)) = (columns.credit, columns.subject) else {
        debug!("Table {}: no credit or subject column, skipped", table_index);
        return;
    };

    let mut pending: Vec<String> = Vec::new();

    for row in table.rows() {
        let cell = |col: Option<usize>| {
            col.and_then(|c| row.get(c))
                .map(|s| normalize(s))
                .unwrap_or_default()
        };
        let subject = cell(Some(subject_col));
        let credit_text = cell(Some(credit_col));
        let grade_text = cell(columns.grade);

        let parsed = parse_credit_and_grade(&credit_text);
        let mut credit = parsed.credit;
        let mut grade = if grade_text.is_empty() {
            parsed.grade_token.clone()
        } else {
            grade_text.clone()
        };

        // Credit and grade columns are sometimes swapped or merged.
        if credit == 0.0 {
            let fallback = parse_credit_and_grade(&grade_text);
            if fallback.credit > 0.0 {
                credit = fallback.credit;
                grade = if parsed.grade_token.is_empty() {
                    fallback.grade_token
                } else {
                    parsed.grade_token
                };
            }
        }

        let complete = credit > 0.0 || is_passing(&grade) || is_pass_vocabulary(&subject);
        if !complete {
            if !subject.is_empty() {
                pending.push(subject);
            }
            continue;
        }

        let mut name_parts = std::mem::take(&mut pending);
        if !subject.is_empty() {
            name_parts.push(subject);
        }

        tally.push(CourseRecord {
            academic_year: cell(columns.year),
            semester: cell(columns.semester),
            subject_name: name_parts.join(" "),
            credit,
            grade_token: grade,
            source_table_index: table_index,
        });
    }

    if !pending.is_empty() {
        debug!(
            "Table {}: dropping unfinished subject fragment {:?}",
            table_index,
            pending.join(" ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [&str; 5] = ["學年", "學期", "課程名稱", "學分", "GPA"];

    fn table(rows: &[[&str; 5]]) -> NormalizedTable {
        NormalizedTable::new(
            HEADER.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn run(tables: &[NormalizedTable]) -> PipelineOutput {
        aggregate(tables, &ColumnKeywords::default())
    }

    #[test]
    fn wrapped_subject_is_stitched() {
        let out = run(&[table(&[
            ["108", "上", "大一英文(一", "", ""],
            ["108", "上", "二)", "3", "B+"],
        ])]);
        assert_eq!(out.passed.len(), 1);
        assert_eq!(out.passed[0].subject_name, "大一英文(一 二)");
        assert_eq!(out.passed[0].credit, 3.0);
        assert_eq!(out.passed[0].grade_token, "B+");
        assert_eq!(out.total_credits, 3.0);
        assert!(out.failed.is_empty());
    }

    #[test]
    fn header_only_table_emits_nothing() {
        let out = run(&[table(&[])]);
        assert_eq!(out, PipelineOutput::default());
    }

    #[test]
    fn failing_grade_goes_to_failed() {
        let out = run(&[table(&[
            ["108", "上", "微積分", "3", "A"],
            ["108", "下", "物理", "2", "F"],
        ])]);
        assert_eq!(out.total_credits, 3.0);
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.failed[0].subject_name, "物理");
        assert_eq!(out.failed[0].academic_year, "108");
        assert_eq!(out.failed[0].semester, "下");
        assert_eq!(out.failed[0].source_table_index, 1);
    }

    #[test]
    fn numeric_score_below_pass_mark_fails() {
        let out = run(&[table(&[["109", "上", "化學", "3", "58"]])]);
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.total_credits, 0.0);
    }

    #[test]
    fn pass_vocabulary_subject_completes_row() {
        let out = run(&[table(&[["109", "上", "抵免", "", ""]])]);
        assert_eq!(out.passed.len(), 1);
        assert_eq!(out.passed[0].credit, 0.0);
        assert_eq!(out.total_credits, 0.0);
    }

    #[test]
    fn credit_recovered_from_grade_column() {
        // Credit column is empty, the grade cell carries "A 3".
        let out = run(&[table(&[["110", "上", "程式設計", "", "A 3"]])]);
        assert_eq!(out.passed.len(), 1);
        assert_eq!(out.passed[0].credit, 3.0);
        assert_eq!(out.passed[0].grade_token, "A");
        assert_eq!(out.total_credits, 3.0);
    }

    #[test]
    fn credit_cell_grade_wins_over_fallback() {
        // The credit cell only holds a letter; the credit comes from the grade column.
        let out = run(&[table(&[["110", "上", "統計", "B", "2"]])]);
        assert_eq!(out.passed.len(), 1);
        assert_eq!(out.passed[0].credit, 2.0);
        assert_eq!(out.passed[0].grade_token, "B");
    }

    #[test]
    fn pass_word_grade_with_credit() {
        let out = run(&[table(&[["110", "下", "服務學習", "0", "通過"]])]);
        assert_eq!(out.passed.len(), 1);
        assert_eq!(out.passed[0].grade_token, "通過");
        assert_eq!(out.total_credits, 0.0);
    }

    #[test]
    fn trailing_fragment_is_dropped() {
        let out = run(&[
            table(&[["108", "上", "未完成的", "", ""]]),
            table(&[["108", "上", "課程", "2", "A"]]),
        ]);
        assert_eq!(out.passed.len(), 1);
        assert_eq!(out.passed[0].subject_name, "課程");
        assert_eq!(out.passed[0].source_table_index, 2);
    }

    #[test]
    fn table_without_subject_column_is_skipped() {
        let t = NormalizedTable::new(
            vec!["學分".into(), "成績".into(), "備註".into()],
            vec![vec!["3".into(), "A".into(), String::new()]],
        );
        assert!(run(&[t]).is_empty());
    }

    #[test]
    fn missing_optional_columns_are_empty() {
        let t = NormalizedTable::new(
            vec!["科目".into(), "學分".into(), "成績".into()],
            vec![vec!["國文".into(), "2".into(), "A-".into()]],
        );
        let out = run(&[t]);
        assert_eq!(out.passed[0].academic_year, "");
        assert_eq!(out.passed[0].semester, "");
    }

    #[test]
    fn total_matches_passed_sum() {
        let out = run(&[table(&[
            ["108", "上", "A課", "3", "A"],
            ["108", "上", "B課", "2.5", "C-"],
            ["108", "上", "C課", "1", "D"],
            ["108", "上", "D課", "0", "PASS"],
            ["108", "上", "E課", "4", ""],
        ])]);
        let sum: f64 = out.passed.iter().map(|r| r.credit).sum();
        assert!((out.total_credits - sum).abs() < 1e-9);
        assert_eq!(out.total_credits, 9.5);
        for r in &out.failed {
            assert!(!r.grade_token.is_empty() && !is_passing(&r.grade_token));
        }
        for r in &out.passed {
            assert!(r.grade_token.is_empty() || is_passing(&r.grade_token));
        }
    }

    #[test]
    fn tally_classifies_records() {
        let mut tally = Tally::new();
        let rec = |grade: &str| CourseRecord {
            academic_year: "108".into(),
            semester: "上".into(),
            subject_name: "微積分".into(),
            credit: 3.0,
            grade_token: grade.into(),
            source_table_index: 0,
        };
        tally.push(rec("F"));
        tally.push(rec("通過"));
        let out = tally.finish();
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.passed.len(), 1);
        assert_eq!(out.total_credits, 3.0);
    }
}
