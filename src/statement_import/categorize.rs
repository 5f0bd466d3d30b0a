//! Automatic categorization of statement transactions.
//!
//! Suggestions come from three strategies, tried in order:
//!
//! 1. Merchant fingerprint: the candidate's description is reduced to a few
//!    meaningful merchant tokens and compared against past transactions for
//!    an exact fingerprint match.
//! 2. Word overlap: the candidate shares either one distinctive word or two
//!    ordinary words with a past transaction.
//! 3. Keyword table: a built-in table of merchant keywords maps the
//!    description to a category label.
//!
//! Transactions nothing matches fall back to the uncategorized sentinel.

use std::collections::HashSet;

use crate::{
    category::{Category, CategoryId},
    statement_import::keywords::KEYWORD_RULES,
    transaction::HistoryEntry,
};

/// The group label for transactions no strategy could categorize.
pub const UNCATEGORIZED_GROUP: &str = "Misc";

/// The category label for transactions no strategy could categorize.
pub const UNCATEGORIZED_NAME: &str = "Untracked";

/// Tokens that carry no merchant information and are ignored when
/// fingerprinting a description.
const STOPWORDS: &[&str] = &[
    // Payment rail noise.
    "pos",
    "purchase",
    "payment",
    "debit",
    "credit",
    "card",
    "visa",
    "mastercard",
    "eftpos",
    "online",
    "transaction",
    "ref",
    "authorised",
    "pending",
    "recurring",
    // Corporate suffixes.
    "ltd",
    "limited",
    "inc",
    "corp",
    "co",
    "llc",
    "plc",
    "pty",
    // Articles and prepositions.
    "the",
    "a",
    "an",
    "of",
    "at",
    "in",
    "on",
    "for",
    "to",
    "by",
    "with",
    "from",
];

/// How many tokens of a cleaned description make up its fingerprint.
const FINGERPRINT_TOKENS: usize = 3;

/// Words this short are ignored when comparing descriptions by word overlap.
const SIGNIFICANT_WORD_LENGTH: usize = 3;

/// A shared word longer than this is distinctive enough to match on by
/// itself.
const DISTINCTIVE_WORD_LENGTH: usize = 6;

/// The category suggested for a statement transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// The id of the matched category, or `None` when the labels do not
    /// correspond to a stored category.
    pub category_id: Option<CategoryId>,
    /// The name of the group the suggested category belongs to.
    pub group_name: String,
    /// The name of the suggested category.
    pub category_name: String,
}

impl Suggestion {
    /// The sentinel suggestion for transactions nothing matched.
    pub fn untracked() -> Self {
        Self {
            category_id: None,
            group_name: UNCATEGORIZED_GROUP.to_owned(),
            category_name: UNCATEGORIZED_NAME.to_owned(),
        }
    }

    fn from_history(entry: &HistoryEntry) -> Self {
        Self {
            category_id: entry.category_id,
            group_name: entry.group_name.clone().unwrap_or_default(),
            category_name: entry.category_name.clone().unwrap_or_default(),
        }
    }

    fn from_category(category: &Category) -> Self {
        Self {
            category_id: Some(category.id),
            group_name: category.group_name.clone(),
            category_name: category.name.as_ref().to_owned(),
        }
    }
}

/// Suggest a category for a transaction description.
///
/// `history` must be ordered most recent first so that recent categorization
/// choices win over older ones. History entries without a real category,
/// including those filed under the uncategorized sentinel, never produce
/// suggestions.
pub fn categorize(
    description: &str,
    history: &[HistoryEntry],
    categories: &[Category],
) -> Suggestion {
    if let Some(suggestion) = match_merchant_fingerprint(description, history) {
        return suggestion;
    }

    if let Some(suggestion) = match_word_overlap(description, history) {
        return suggestion;
    }

    if let Some(suggestion) = match_keyword_rules(description, categories) {
        return suggestion;
    }

    Suggestion::untracked()
}

/// Find the stored category whose name fuzzily matches `label`: either name
/// contains the other, ignoring case.
pub(crate) fn resolve_category<'a>(label: &str, categories: &'a [Category]) -> Option<&'a Category> {
    let label = label.to_lowercase();

    categories.iter().find(|category| {
        let name = category.name.as_ref().to_lowercase();

        name.contains(&label) || label.contains(&name)
    })
}

fn match_merchant_fingerprint(description: &str, history: &[HistoryEntry]) -> Option<Suggestion> {
    let fingerprint = merchant_fingerprint(description);

    if fingerprint.is_empty() {
        return None;
    }

    history
        .iter()
        .filter(|entry| has_real_category(entry))
        .find(|entry| merchant_fingerprint(&entry.description) == fingerprint)
        .map(Suggestion::from_history)
}

fn match_word_overlap(description: &str, history: &[HistoryEntry]) -> Option<Suggestion> {
    let candidate_words = significant_words(description);

    if candidate_words.is_empty() {
        return None;
    }

    history
        .iter()
        .filter(|entry| has_real_category(entry))
        .find(|entry| {
            let entry_words = significant_words(&entry.description);
            let shared: Vec<&String> = entry_words.intersection(&candidate_words).collect();

            let has_distinctive_word = shared
                .iter()
                .any(|word| word.chars().count() > DISTINCTIVE_WORD_LENGTH);

            has_distinctive_word || shared.len() >= 2
        })
        .map(Suggestion::from_history)
}

fn match_keyword_rules(description: &str, categories: &[Category]) -> Option<Suggestion> {
    let description = description.to_lowercase();

    let rule = KEYWORD_RULES.iter().find(|rule| {
        rule.keywords
            .iter()
            .any(|keyword| description.contains(keyword))
    })?;

    match resolve_category(rule.category_name, categories) {
        Some(category) => Some(Suggestion::from_category(category)),
        None => Some(Suggestion {
            category_id: None,
            group_name: rule.group_name.to_owned(),
            category_name: rule.category_name.to_owned(),
        }),
    }
}

/// Reduce a description to its first few meaningful merchant tokens:
/// lowercased, digits stripped, stopwords dropped.
fn merchant_fingerprint(description: &str) -> String {
    let cleaned: String = description
        .to_lowercase()
        .chars()
        .filter(|character| !character.is_ascii_digit())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .take(FINGERPRINT_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The words of a description that are long enough to be meaningful.
fn significant_words(description: &str) -> HashSet<String> {
    description
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > SIGNIFICANT_WORD_LENGTH)
        .map(str::to_owned)
        .collect()
}

/// Whether a history entry can drive suggestions. Entries without a stored
/// category, or filed under the uncategorized sentinel, cannot.
fn has_real_category(entry: &HistoryEntry) -> bool {
    entry.category_id.is_some()
        && entry
            .category_name
            .as_deref()
            .is_some_and(|name| !name.eq_ignore_ascii_case(UNCATEGORIZED_NAME))
}

#[cfg(test)]
mod merchant_fingerprint_tests {
    use super::merchant_fingerprint;

    #[test]
    fn strips_digits_and_stopwords() {
        let got = merchant_fingerprint("POS 1234 STARBUCKS COFFEE COMPANY SEATTLE");

        assert_eq!(got, "starbucks coffee company", "got {got:?}");
    }

    #[test]
    fn collapses_whitespace() {
        let got = merchant_fingerprint("  CITY   PARKING  ");

        assert_eq!(got, "city parking", "got {got:?}");
    }

    #[test]
    fn all_noise_input_yields_empty_fingerprint() {
        let got = merchant_fingerprint("POS 123456 PURCHASE");

        assert!(got.is_empty(), "want empty fingerprint, got {got:?}");
    }

    #[test]
    fn drops_articles_prepositions_and_corporate_suffixes() {
        let got = merchant_fingerprint("THE HOUSE OF COFFEE LTD");

        assert_eq!(got, "house coffee", "got {got:?}");
    }
}
