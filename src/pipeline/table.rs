//! Normalised, rectangular tables.
//!
//! Raw tables come from the ruled-line detector ([`super::lines`]) or from a
//! word-processor document ([`super::docx`]) as rows of optional cell text.
//! [`NormalizedTable::from_raw_rows`] turns them into a header of unique
//! column names plus data rows that are exactly as wide as the header.

use super::normalize::{normalize, normalize_opt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rows of optional cell text, exactly as a detector produced them.
pub type RawTable = Vec<Vec<Option<String>>>;

/// Base name given to empty or one-character header cells.
pub const PLACEHOLDER_COLUMN: &str = "column";

/// A header row of unique names and the data rows aligned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Normalise a raw table.
    ///
    /// Returns `None` when every row is empty (there is no header to use).
    pub fn from_raw_rows(raw: RawTable) -> Option<Self> {
        let mut rows = raw
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|cell| normalize_opt(cell.as_deref()))
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()));

        let header = unique_header(rows.next()?);
        let width = header.len();
        let rows = rows
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Some(Self { header, rows })
    }

    /// Build a table from already-clean parts, applying the same header and
    /// width repairs as [`Self::from_raw_rows`].
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let header = unique_header(header.iter().map(|h| normalize(h)).collect());
        let width = header.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut row: Vec<String> = row.iter().map(|c| normalize(c)).collect();
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// True when the table has a header but no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Replace unusable names with the placeholder and suffix duplicates.
///
/// The first occurrence of a name keeps it; later ones become `name_1`,
/// `name_2`, … skipping any suffix that is already taken.
fn unique_header(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let base = if name.chars().count() < 2 {
            PLACEHOLDER_COLUMN.to_string()
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut counter = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}
