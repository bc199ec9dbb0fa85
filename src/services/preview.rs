use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::row::MappingRow;

/// Line terminator of the submitted mapping text.
pub const LINE_END: &str = "\r\n";

/// Whether repeated `from` paths are flagged and left out of the preview.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateDetection {
    #[default]
    Enabled,
    Disabled,
}

impl From<bool> for DuplicateDetection {
    fn from(enabled: bool) -> Self {
        if enabled {
            DuplicateDetection::Enabled
        } else {
            DuplicateDetection::Disabled
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    pub updated_rows: Vec<MappingRow>,
    pub preview: String,
    /// Set when at most one row is left; the table chrome is hidden then.
    pub hide_table: bool,
}

pub fn recompute(rows: &[MappingRow]) -> PreviewResult {
    recompute_with(rows, DuplicateDetection::Enabled)
}

pub fn recompute_with(rows: &[MappingRow], detection: DuplicateDetection) -> PreviewResult {
    let mut seen: HashSet<&str> = HashSet::with_capacity(rows.len());
    let mut preview = String::new();
    let mut updated_rows: Vec<MappingRow> = Vec::with_capacity(rows.len());

    for row in rows {
        let mut updated = row.clone();

        let repeated = match detection {
            // insert() is false when the path was already taken by an earlier row
            DuplicateDetection::Enabled => !seen.insert(row.from.as_str()),
            DuplicateDetection::Disabled => false,
        };
        updated.is_duplicate_of_earlier = repeated;

        // An empty `from` never maps anything, even the first time.
        if !repeated && !row.from.is_empty() {
            preview.push_str(&row.from);
            preview.push('=');
            preview.push_str(&row.to);
            preview.push_str(LINE_END);
        }

        updated_rows.push(updated);
    }

    let duplicates = updated_rows
        .iter()
        .filter(|r| r.is_duplicate_of_earlier)
        .count();
    debug!(rows = rows.len(), duplicates, "recomputed mapping preview");

    PreviewResult {
        hide_table: rows.len() <= 1,
        updated_rows,
        preview,
    }
}

/// Indices of canonical rows that are repeated further down the table.
pub fn canonical_rows_with_duplicates(rows: &[MappingRow]) -> HashSet<usize> {
    let mut first_index: HashMap<&str, usize> = HashMap::new();
    let mut out = HashSet::new();

    for (i, row) in rows.iter().enumerate() {
        match first_index.get(row.from.as_str()) {
            Some(&canonical) if row.is_duplicate_of_earlier => {
                out.insert(canonical);
            }
            Some(_) => {}
            None => {
                first_index.insert(row.from.as_str(), i);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(&str, &str)]) -> Vec<MappingRow> {
        pairs
            .iter()
            .map(|(from, to)| MappingRow::new(*from, *to, ""))
            .collect()
    }

    fn flags(result: &PreviewResult) -> Vec<bool> {
        result
            .updated_rows
            .iter()
            .map(|r| r.is_duplicate_of_earlier)
            .collect()
    }

    #[test]
    fn later_repeat_is_flagged_and_skipped() {
        let result = recompute(&rows(&[("a", "1"), ("b", "2"), ("a", "3")]));
        assert_eq!(result.preview, "a=1\r\nb=2\r\n");
        assert_eq!(flags(&result), vec![false, false, true]);
        assert!(!result.hide_table);
    }

    #[test]
    fn empty_table_gives_empty_preview() {
        let result = recompute(&[]);
        assert_eq!(result.preview, "");
        assert!(result.updated_rows.is_empty());
        assert!(result.hide_table);
    }

    #[test]
    fn single_row_is_serialized_and_hides_table() {
        let result = recompute(&rows(&[("x", "y")]));
        assert_eq!(result.preview, "x=y\r\n");
        assert!(result.hide_table);
    }

    #[test]
    fn empty_from_is_not_serialized_but_is_tracked() {
        let result = recompute(&rows(&[("", "1"), ("a", "2"), ("", "3")]));
        assert_eq!(result.preview, "a=2\r\n");
        assert_eq!(flags(&result), vec![false, false, true]);
    }

    #[test]
    fn stale_flag_is_cleared_when_path_changes() {
        let mut input = rows(&[("a", "1"), ("b", "2")]);
        input[1].is_duplicate_of_earlier = true;
        let result = recompute(&input);
        assert_eq!(flags(&result), vec![false, false]);
    }

    #[test]
    fn comment_and_to_survive_recompute() {
        let input = vec![MappingRow::new(".", "perforce://host:1666:////depot/src", "mock")];
        let result = recompute(&input);
        assert_eq!(result.updated_rows[0].comment, "mock");
        assert_eq!(result.preview, ".=perforce://host:1666:////depot/src\r\n");
    }

    #[test]
    fn disabled_detection_keeps_every_line() {
        let result = recompute_with(&rows(&[("a", "1"), ("a", "2")]), DuplicateDetection::Disabled);
        assert_eq!(result.preview, "a=1\r\na=2\r\n");
        assert_eq!(flags(&result), vec![false, false]);
    }

    #[test]
    fn canonical_rows_are_found() {
        let result = recompute(&rows(&[("a", "1"), ("b", "2"), ("a", "3"), ("a", "4")]));
        let canonical = canonical_rows_with_duplicates(&result.updated_rows);
        assert_eq!(canonical.len(), 1);
        assert!(canonical.contains(&0));
    }
}
