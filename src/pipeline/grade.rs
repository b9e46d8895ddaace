//! Pass/fail classification of grade tokens.
//!
//! Transcripts mix letter grades, 0–100 numeric scores and pass/exempt
//! words. The checks run in a fixed order; explicit failing tokens are
//! tested before the `A`–`C` range so that `F` can never slip through.

use super::cell::PASS_VOCABULARY;
use super::normalize::{ascii_digit, normalize, parse_decimal};
use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens that always mean "not passed".
pub const FAILING_TOKENS: [&str; 8] = ["D", "D-", "E", "F", "X", "不通過", "未通過", "不及格"];

/// Minimum numeric score that counts as a pass.
pub const NUMERIC_PASS_MARK: f64 = 60.0;

static RE_PASSING_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-C][+\-]?$").unwrap());

/// Decide whether a grade token is a pass.
pub fn is_passing(grade_token: &str) -> bool {
    let token = normalize(grade_token).to_uppercase();

    if token.is_empty() {
        return false;
    }
    if PASS_VOCABULARY.contains(&token.as_str()) {
        return true;
    }
    if FAILING_TOKENS.contains(&token.as_str()) {
        return false;
    }
    if RE_PASSING_LETTER.is_match(&token) {
        return true;
    }
    if is_plain_decimal(&token) {
        return parse_decimal(&token)
            .map(|score| score >= NUMERIC_PASS_MARK)
            .unwrap_or(false);
    }
    false
}

/// Digits (ASCII or full-width) with at most one decimal point, nothing else.
fn is_plain_decimal(token: &str) -> bool {
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in token.chars() {
        match c {
            '.' => dots += 1,
            c if ascii_digit(c).is_some() => digits += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}
