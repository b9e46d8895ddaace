//! Grades-table recognition and column-role resolution.
//!
//! Both work on header names with every whitespace character removed and
//! lowercased, so `"課程 名稱"`, `"課程名稱"` and `"Course Name"` compare as
//! `"課程名稱"` / `"coursename"`.

use super::table::NormalizedTable;
use crate::config::{ClassifierProfile, ColumnKeywords, ColumnRole};

/// Fewest columns a grades table can have.
pub const MIN_GRADES_COLUMNS: usize = 3;

/// Strip all whitespace and lowercase.
pub fn column_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when the table's header carries every keyword family the profile
/// requires and the table is at least [`MIN_GRADES_COLUMNS`] wide.
pub fn looks_like_grades_table(
    table: &NormalizedTable,
    keywords: &ColumnKeywords,
    profile: ClassifierProfile,
) -> bool {
    if table.column_count() < MIN_GRADES_COLUMNS {
        return false;
    }
    let columns: Vec<String> = table.header().iter().map(|h| column_key(h)).collect();

    ColumnRole::ALL
        .into_iter()
        .filter(|&role| profile.requires(role))
        .all(|role| {
            keywords
                .family(role)
                .iter()
                .map(|k| column_key(k))
                .any(|k| !k.is_empty() && columns.iter().any(|c| c.contains(&k)))
        })
}

/// Index of the column that fills `role`, if any.
///
/// An exact match on any keyword beats a containment match; within each
/// pass, keyword order is priority order and the leftmost column wins.
pub fn resolve_column(header: &[String], keywords: &ColumnKeywords, role: ColumnRole) -> Option<usize> {
    let columns: Vec<String> = header.iter().map(|h| column_key(h)).collect();
    let family: Vec<String> = keywords
        .family(role)
        .iter()
        .map(|k| column_key(k))
        .filter(|k| !k.is_empty())
        .collect();

    family
        .iter()
        .find_map(|k| columns.iter().position(|c| c == k))
        .or_else(|| {
            family
                .iter()
                .find_map(|k| columns.iter().position(|c| c.contains(k.as_str())))
        })
}

/// Resolved column positions for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMap {
    pub credit: Option<usize>,
    pub subject: Option<usize>,
    pub grade: Option<usize>,
    pub year: Option<usize>,
    pub semester: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(header: &[String], keywords: &ColumnKeywords) -> Self {
        let find = |role| resolve_column(header, keywords, role);
        Self {
            credit: find(ColumnRole::Credit),
            subject: find(ColumnRole::Subject),
            grade: find(ColumnRole::Grade),
            year: find(ColumnRole::Year),
            semester: find(ColumnRole::Semester),
        }
    }
}
