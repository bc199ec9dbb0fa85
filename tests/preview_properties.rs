//! Properties of the duplicate-path rule.

use std::collections::HashSet;

use mapping_core::model::row::MappingRow;
use mapping_core::services::preview::{recompute, recompute_with, DuplicateDetection};
use proptest::prelude::*;

fn arb_path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(".".to_string()),
        "[a-c]{1,2}",
        "[a-z/]{1,8}",
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<MappingRow>> {
    prop::collection::vec(
        (arb_path(), "[a-z:/]{0,12}", any::<bool>()).prop_map(|(from, to, stale)| MappingRow {
            from,
            to,
            comment: String::new(),
            is_duplicate_of_earlier: stale,
        }),
        0..12,
    )
}

fn distinct_rows() -> impl Strategy<Value = Vec<MappingRow>> {
    prop::collection::hash_set("[a-z]{1,6}", 0..10).prop_flat_map(|froms| {
        let froms: Vec<String> = froms.into_iter().collect();
        let n = froms.len();
        (Just(froms), prop::collection::vec("[a-z0-9:/]{0,10}", n)).prop_map(|(froms, tos)| {
            froms
                .into_iter()
                .zip(tos)
                .map(|(f, t)| MappingRow::new(f, t, ""))
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn distinct_paths_give_one_line_per_row(rows in distinct_rows()) {
        let result = recompute(&rows);

        let expected: String = rows.iter().map(|r| format!("{}={}\r\n", r.from, r.to)).collect();
        prop_assert_eq!(result.preview, expected);
        prop_assert!(result.updated_rows.iter().all(|r| !r.is_duplicate_of_earlier));
    }

    #[test]
    fn only_first_occurrence_is_canonical(rows in arb_rows()) {
        let result = recompute(&rows);
        let mut seen = HashSet::new();
        let mut expected = String::new();

        for (input, out) in rows.iter().zip(&result.updated_rows) {
            let first = seen.insert(input.from.clone());
            prop_assert_eq!(out.is_duplicate_of_earlier, !first);
            if first && !input.from.is_empty() {
                expected.push_str(&format!("{}={}\r\n", input.from, input.to));
            }
        }
        prop_assert_eq!(result.preview, expected);
    }

    #[test]
    fn recompute_is_idempotent(rows in arb_rows()) {
        let once = recompute(&rows);
        prop_assert_eq!(recompute(&rows), once.clone());
        prop_assert_eq!(recompute(&once.updated_rows), once);
    }

    #[test]
    fn row_contents_are_preserved(rows in arb_rows()) {
        let result = recompute(&rows);
        prop_assert_eq!(result.updated_rows.len(), rows.len());
        for (input, out) in rows.iter().zip(&result.updated_rows) {
            prop_assert_eq!(&input.from, &out.from);
            prop_assert_eq!(&input.to, &out.to);
            prop_assert_eq!(&input.comment, &out.comment);
        }
        prop_assert_eq!(result.hide_table, rows.len() <= 1);
    }

    #[test]
    fn disabled_detection_flags_nothing(rows in arb_rows()) {
        let result = recompute_with(&rows, DuplicateDetection::Disabled);
        let lines = rows.iter().filter(|r| !r.from.is_empty()).count();
        prop_assert!(result.updated_rows.iter().all(|r| !r.is_duplicate_of_earlier));
        prop_assert_eq!(result.preview.matches("\r\n").count(), lines);
    }
}

#[test]
fn two_empty_paths_duplicate_each_other() {
    let rows = vec![MappingRow::new("", "x", ""), MappingRow::new("", "y", "")];
    let result = recompute(&rows);
    assert!(!result.updated_rows[0].is_duplicate_of_earlier);
    assert!(result.updated_rows[1].is_duplicate_of_earlier);
    assert_eq!(result.preview, "");
}
