//! Detection of statement transactions that were already imported.
//!
//! Statement exports overlap: downloading March and later downloading
//! February through April gives the second file a copy of every March
//! transaction. Matching is deliberately fuzzy because banks rewrite
//! description text between exports, so only a prefix of the description
//! has to line up.

use crate::{statement_import::models::StatementTransaction, transaction::HistoryEntry};

/// Amounts closer together than this are considered equal.
const AMOUNT_TOLERANCE: f64 = 0.01;

/// How many leading characters of an existing description must appear in a
/// candidate's description for the two to match.
const DESCRIPTION_PREFIX_LENGTH: usize = 10;

/// Whether `candidate` is a duplicate of the existing transaction.
///
/// Two transactions match when they fall on the same date, their amounts
/// differ by less than a cent, and the first ten characters of the existing
/// description appear anywhere in the candidate's description, ignoring
/// case.
pub fn is_duplicate(candidate: &StatementTransaction, existing: &HistoryEntry) -> bool {
    if candidate.date != existing.date {
        return false;
    }

    if (candidate.amount - existing.amount).abs() >= AMOUNT_TOLERANCE {
        return false;
    }

    let existing_prefix: String = existing
        .description
        .to_lowercase()
        .chars()
        .take(DESCRIPTION_PREFIX_LENGTH)
        .collect();

    candidate
        .description
        .to_lowercase()
        .contains(&existing_prefix)
}

/// Whether `candidate` duplicates any of the existing transactions.
pub fn is_duplicate_of_any(candidate: &StatementTransaction, existing: &[HistoryEntry]) -> bool {
    existing.iter().any(|entry| is_duplicate(candidate, entry))
}

#[cfg(test)]
mod dedupe_tests {
    use crate::{statement_import::models::StatementTransaction, transaction::HistoryEntry};

    use super::{is_duplicate, is_duplicate_of_any};

    fn candidate(date: &str, amount: f64, description: &str) -> StatementTransaction {
        StatementTransaction {
            date: date.to_owned(),
            amount,
            description: description.to_owned(),
            check_number: None,
        }
    }

    fn existing(date: &str, amount: f64, description: &str) -> HistoryEntry {
        HistoryEntry {
            date: date.to_owned(),
            amount,
            description: description.to_owned(),
            category_id: None,
            category_name: None,
            group_name: None,
        }
    }

    #[test]
    fn identical_transactions_match() {
        let got = is_duplicate(
            &candidate("2025-03-14", -42.50, "CITY PARKING"),
            &existing("2025-03-14", -42.50, "CITY PARKING"),
        );

        assert!(got, "identical transactions should match");
    }

    #[test]
    fn different_dates_do_not_match() {
        let got = is_duplicate(
            &candidate("2025-03-15", -42.50, "CITY PARKING"),
            &existing("2025-03-14", -42.50, "CITY PARKING"),
        );

        assert!(!got, "transactions a day apart should not match");
    }

    #[test]
    fn amounts_within_a_cent_match() {
        let got = is_duplicate(
            &candidate("2025-03-14", -42.504, "CITY PARKING"),
            &existing("2025-03-14", -42.50, "CITY PARKING"),
        );

        assert!(got, "amounts less than a cent apart should match");
    }

    #[test]
    fn amounts_cents_apart_do_not_match() {
        let got = is_duplicate(
            &candidate("2025-03-14", -42.52, "CITY PARKING"),
            &existing("2025-03-14", -42.50, "CITY PARKING"),
        );

        assert!(!got, "amounts two cents apart should not match");
    }

    #[test]
    fn rewritten_description_still_matches_on_prefix() {
        let got = is_duplicate(
            &candidate("2024-01-05", -12.00, "Coffee Shop Downtown"),
            &existing("2024-01-05", -12.00, "coffee shop"),
        );

        assert!(got, "description sharing the existing prefix should match");
    }

    #[test]
    fn description_matching_ignores_case() {
        let got = is_duplicate(
            &candidate("2025-03-14", -5.60, "starbucks 1234"),
            &existing("2025-03-14", -5.60, "STARBUCKS 1234"),
        );

        assert!(got, "description matching should ignore case");
    }

    #[test]
    fn unrelated_descriptions_do_not_match() {
        let got = is_duplicate(
            &candidate("2024-01-05", -12.00, "Coffee Shop Downtown"),
            &existing("2024-01-05", -12.00, "Different Merchant Entirely"),
        );

        assert!(!got, "unrelated descriptions should not match");
    }

    #[test]
    fn short_existing_description_matches_as_a_whole() {
        let got = is_duplicate(
            &candidate("2025-03-14", -5.60, "THE CORNER CAFE WELLINGTON"),
            &existing("2025-03-14", -5.60, "CAFE"),
        );

        assert!(got, "short existing description should match as substring");
    }

    #[test]
    fn any_single_match_marks_the_candidate() {
        let history = vec![
            existing("2025-03-10", -5.60, "STARBUCKS 1234"),
            existing("2025-03-14", -5.60, "STARBUCKS 1234"),
        ];

        let got = is_duplicate_of_any(&candidate("2025-03-14", -5.60, "STARBUCKS 1234"), &history);

        assert!(got, "a match against any history entry should count");
    }

    #[test]
    fn empty_history_never_matches() {
        let got = is_duplicate_of_any(&candidate("2025-03-14", -5.60, "STARBUCKS 1234"), &[]);

        assert!(!got, "no history should mean no duplicates");
    }
}
