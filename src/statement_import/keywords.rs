//! The built-in keyword table used to categorize merchants that have never
//! been seen before.

/// Maps merchant keywords to a category label.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeywordRule {
    /// Lowercase substrings to look for in a transaction description.
    pub keywords: &'static [&'static str],
    /// The group the category belongs to.
    pub group_name: &'static str,
    /// The category to file matching transactions under.
    pub category_name: &'static str,
}

/// The rule table, checked top to bottom. The first rule with a matching
/// keyword wins, so more specific rules must come before broader ones.
pub(crate) const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &[
            "netflix",
            "spotify",
            "hulu",
            "disney+",
            "youtube premium",
            "apple.com/bill",
            "icloud",
            "github",
            "adobe",
            "dropbox",
            "steam",
        ],
        group_name: "Technology",
        category_name: "Subscriptions",
    },
    KeywordRule {
        keywords: &["uber eats", "doordash", "grubhub", "deliveroo", "menulog"],
        group_name: "Food",
        category_name: "Takeaway",
    },
    KeywordRule {
        keywords: &[
            "starbucks",
            "mcdonald",
            "burger",
            "pizza",
            "chipotle",
            "dunkin",
            "kfc",
            "taco",
            "sushi",
            "restaurant",
            "cafe",
            "coffee",
            "bakery",
        ],
        group_name: "Food",
        category_name: "Dining Out",
    },
    KeywordRule {
        keywords: &[
            "kroger",
            "safeway",
            "aldi",
            "trader joe",
            "whole foods",
            "costco",
            "countdown",
            "woolworths",
            "grocery",
            "supermarket",
        ],
        group_name: "Food",
        category_name: "Groceries",
    },
    KeywordRule {
        keywords: &["amazon", "amzn", "ebay", "etsy", "walmart", "target", "ikea"],
        group_name: "Shopping",
        category_name: "Shopping",
    },
    KeywordRule {
        keywords: &[
            "uber",
            "lyft",
            "taxi",
            "shell",
            "chevron",
            "caltex",
            "bp connect",
            "fuel",
            "parking",
            "transit",
            "metro",
            "rail",
        ],
        group_name: "Transportation",
        category_name: "Transport",
    },
    KeywordRule {
        keywords: &[
            "electric",
            "power bill",
            "water bill",
            "internet",
            "broadband",
            "comcast",
            "verizon",
            "vodafone",
            "utility",
            "utilities",
        ],
        group_name: "Home",
        category_name: "Utilities",
    },
    KeywordRule {
        keywords: &["rent", "landlord", "mortgage", "body corporate"],
        group_name: "Home",
        category_name: "Rent",
    },
    KeywordRule {
        keywords: &[
            "pharmacy",
            "chemist",
            "walgreens",
            "doctor",
            "dental",
            "clinic",
            "hospital",
        ],
        group_name: "Health",
        category_name: "Medical",
    },
    KeywordRule {
        keywords: &["gym", "fitness", "yoga"],
        group_name: "Health",
        category_name: "Fitness",
    },
    KeywordRule {
        keywords: &["cinema", "theatre", "theater", "ticketmaster", "concert"],
        group_name: "Entertainment",
        category_name: "Entertainment",
    },
    KeywordRule {
        keywords: &["insurance", "geico", "state farm", "aa insurance"],
        group_name: "Financial",
        category_name: "Insurance",
    },
    KeywordRule {
        keywords: &[
            "atm fee",
            "overdraft",
            "service charge",
            "monthly fee",
            "account fee",
            "interest charge",
        ],
        group_name: "Financial",
        category_name: "Bank Fees",
    },
    KeywordRule {
        keywords: &["payroll", "direct deposit", "salary", "wages"],
        group_name: "Income",
        category_name: "Salary",
    },
    KeywordRule {
        keywords: &["transfer", "zelle", "venmo", "paypal", "wire"],
        group_name: "Transfers",
        category_name: "Transfer",
    },
];

#[cfg(test)]
mod keyword_rule_tests {
    use super::KEYWORD_RULES;

    #[test]
    fn keywords_are_lowercase() {
        for rule in KEYWORD_RULES {
            for keyword in rule.keywords {
                assert_eq!(
                    *keyword,
                    keyword.to_lowercase(),
                    "keyword {keyword:?} in rule {:?} must be lowercase",
                    rule.category_name
                );
            }
        }
    }

    #[test]
    fn takeaway_outranks_transport_for_uber_eats() {
        let takeaway_position = KEYWORD_RULES
            .iter()
            .position(|rule| rule.keywords.contains(&"uber eats"))
            .unwrap();
        let transport_position = KEYWORD_RULES
            .iter()
            .position(|rule| rule.keywords.contains(&"uber"))
            .unwrap();

        assert!(
            takeaway_position < transport_position,
            "'uber eats' must be checked before 'uber'"
        );
    }

    #[test]
    fn rules_have_labels() {
        for rule in KEYWORD_RULES {
            assert!(!rule.group_name.is_empty());
            assert!(!rule.category_name.is_empty());
            assert!(!rule.keywords.is_empty());
        }
    }
}
