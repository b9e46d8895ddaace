//! Cell parser: recover a `(credit, grade)` pair from one free-form cell.
//!
//! Transcript generators are inconsistent about what lands in a cell. The
//! same course can show up as `"3"`, `"A 3"`, `"3/B+"`, `"3 ／ B+"` or
//! `"通過"`. The parser applies a fixed cascade and the first rule that
//! matches wins:
//!
//! 1. pass/exempt vocabulary (`通過`, `抵免`, `PASS`, `EXEMPT`) → credit 0
//! 2. `<letter> <number>` at the start of the cell
//! 3. `<number> <letter>` at the start of the cell
//! 4. any number
//! 5. any letter grade
//! 6. nothing → `(0.0, "")`
//!
//! Full-width digits (`３`, `２.５`) count as numbers. A match in any other
//! digit script does not parse and falls through to the next rule.

use super::normalize::{normalize, parse_decimal};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tokens that count as passed without a letter grade.
pub const PASS_VOCABULARY: [&str; 4] = ["通過", "抵免", "PASS", "EXEMPT"];

/// Output of [`parse_credit_and_grade`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Credit hours; `0.0` when none was found.
    pub credit: f64,
    /// Uppercased letter grade, a pass/exempt word, or empty.
    pub grade_token: String,
}

impl ParseResult {
    fn new(credit: f64, grade_token: impl Into<String>) -> Self {
        Self {
            credit,
            grade_token: grade_token.into(),
        }
    }
}

static RE_GRADE_THEN_CREDIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Fa-f][+\-]?)\s*[/／]?\s*(\d+(?:\.\d+)?)").unwrap());

static RE_CREDIT_THEN_GRADE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*[/／]?\s*([A-Fa-f][+\-]?)").unwrap());

static RE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

static RE_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Fa-f][+\-]?").unwrap());

/// True when `text` is one of [`PASS_VOCABULARY`], ignoring case and spacing.
pub fn is_pass_vocabulary(text: &str) -> bool {
    let upper = normalize(text).to_uppercase();
    PASS_VOCABULARY.contains(&upper.as_str())
}

/// Parse a single cell into a credit/grade pair. Never fails.
pub fn parse_credit_and_grade(text: &str) -> ParseResult {
    let text = normalize(text);

    if is_pass_vocabulary(&text) {
        return ParseResult::new(0.0, text);
    }

    if let Some(caps) = RE_GRADE_THEN_CREDIT.captures(&text) {
        if let Some(credit) = parse_decimal(&caps[2]) {
            return ParseResult::new(credit, caps[1].to_uppercase());
        }
    }

    if let Some(caps) = RE_CREDIT_THEN_GRADE.captures(&text) {
        if let Some(credit) = parse_decimal(&caps[1]) {
            return ParseResult::new(credit, caps[2].to_uppercase());
        }
    }

    if let Some(m) = RE_NUMBER.find(&text) {
        if let Some(credit) = parse_decimal(m.as_str()) {
            return ParseResult::new(credit, "");
        }
    }

    if let Some(m) = RE_LETTER.find(&text) {
        return ParseResult::new(0.0, m.as_str().to_uppercase());
    }

    ParseResult::default()
}
