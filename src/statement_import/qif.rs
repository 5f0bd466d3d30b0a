//! A parser for QIF (Quicken Interchange Format) bank statements.
//!
//! QIF is a line-oriented format. Each line starts with a single-character
//! tag, a record ends with a line containing only `^`, and the format
//! carries no information about the order of date components. Parsing
//! therefore takes a [DateFormat] hint chosen by the user.

use crate::statement_import::{
    date::{DateFormat, normalize_date},
    models::StatementTransaction,
    scan::split_tag_line,
};

/// Parse every complete transaction record from QIF statement text.
///
/// Records missing a date, amount, or description are dropped. This function
/// never fails: unreadable input simply produces fewer records, and an empty
/// statement produces none.
pub fn parse_qif(text: &str, date_format: DateFormat) -> Vec<StatementTransaction> {
    let mut records = Vec::new();
    let mut block = QifBlock::default();

    for line in text.lines() {
        if line.trim().is_empty() || line.starts_with('!') {
            continue;
        }

        if line.trim() == "^" {
            if let Some(record) = block.finish() {
                records.push(record);
            }

            block = QifBlock::default();
            continue;
        }

        let Some((tag, value)) = split_tag_line(line) else {
            continue;
        };

        match tag {
            'D' => block.set_date(value, date_format),
            'T' => block.set_amount(value),
            'P' => block.set_payee(value),
            'M' => block.add_memo(value),
            'N' => block.set_check_number(value),
            // Other tags (category, cleared status, address) are not imported.
            _ => {}
        }
    }

    // The final record is not required to have a terminator line.
    if let Some(record) = block.finish() {
        records.push(record);
    }

    records
}

/// Accumulates tagged lines until a complete transaction can be emitted.
#[derive(Debug, Default)]
struct QifBlock {
    date: Option<String>,
    amount: Option<f64>,
    description: String,
    has_payee: bool,
    check_number: Option<String>,
}

impl QifBlock {
    fn set_date(&mut self, value: &str, date_format: DateFormat) {
        match normalize_date(value, date_format) {
            Ok(date) => self.date = Some(date),
            Err(error) => tracing::debug!("Ignoring unreadable QIF date {value:?}: {error}"),
        }
    }

    fn set_amount(&mut self, value: &str) {
        match value.replace(',', "").parse() {
            Ok(amount) => self.amount = Some(amount),
            Err(error) => tracing::debug!("Ignoring unreadable QIF amount {value:?}: {error}"),
        }
    }

    /// The payee becomes the description, replacing any memo text seen so far.
    /// An empty payee line is treated as missing so a memo can stand alone.
    fn set_payee(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }

        self.description = value.to_owned();
        self.has_payee = true;
    }

    /// Memo text extends a payee description, or stands in for a missing one.
    fn add_memo(&mut self, value: &str) {
        if !self.has_payee {
            self.description = value.to_owned();
        } else if !value.is_empty() && value != self.description {
            self.description = format!("{} - {}", self.description, value);
        }
    }

    fn set_check_number(&mut self, value: &str) {
        if !value.is_empty() {
            self.check_number = Some(value.to_owned());
        }
    }

    /// Emit the accumulated record if it has all the required fields,
    /// otherwise drop it.
    fn finish(self) -> Option<StatementTransaction> {
        let (Some(date), Some(amount)) = (self.date, self.amount) else {
            return None;
        };

        if self.description.is_empty() {
            return None;
        }

        Some(StatementTransaction {
            date,
            amount,
            description: self.description,
            check_number: self.check_number,
        })
    }
}

#[cfg(test)]
mod parse_qif_tests {
    use crate::statement_import::{date::DateFormat, models::StatementTransaction};

    use super::parse_qif;

    const SAMPLE_QIF: &str = "\
!Type:Bank
D03/14/2025
T-42.50
PCITY PARKING
MSTATION ST CARPARK
N1234
^
D03/15/2025
T1250.00
PACME PAYROLL
^
";

    #[test]
    fn parses_complete_records() {
        let want = vec![
            StatementTransaction {
                date: "2025-03-14".to_owned(),
                amount: -42.50,
                description: "CITY PARKING - STATION ST CARPARK".to_owned(),
                check_number: Some("1234".to_owned()),
            },
            StatementTransaction {
                date: "2025-03-15".to_owned(),
                amount: 1250.0,
                description: "ACME PAYROLL".to_owned(),
                check_number: None,
            },
        ];

        let got = parse_qif(SAMPLE_QIF, DateFormat::MonthDayYear);

        assert_eq!(got, want, "want {want:?}, got {got:?}");
    }

    #[test]
    fn empty_input_yields_no_records() {
        let got = parse_qif("", DateFormat::MonthDayYear);

        assert!(got.is_empty(), "want no records, got {got:?}");
    }

    #[test]
    fn header_and_blank_lines_are_ignored() {
        let text = "!Type:Bank\n\nD03/14/2025\nT-1.00\nPCOFFEE\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got.len(), 1, "want 1 record, got {got:?}");
    }

    #[test]
    fn final_record_is_emitted_without_terminator() {
        let text = "D03/14/2025\nT-1.00\nPCOFFEE";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got.len(), 1, "want 1 record, got {got:?}");
        assert_eq!(got[0].description, "COFFEE");
    }

    #[test]
    fn record_missing_date_is_dropped() {
        let text = "T-1.00\nPCOFFEE\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert!(got.is_empty(), "want no records, got {got:?}");
    }

    #[test]
    fn record_missing_amount_is_dropped() {
        let text = "D03/14/2025\nPCOFFEE\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert!(got.is_empty(), "want no records, got {got:?}");
    }

    #[test]
    fn record_missing_description_is_dropped() {
        let text = "D03/14/2025\nT-1.00\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert!(got.is_empty(), "want no records, got {got:?}");
    }

    #[test]
    fn unreadable_date_drops_the_record_not_the_file() {
        let text = "D99/99/2025\nT-1.00\nPCOFFEE\n^\nD03/14/2025\nT-2.00\nPLUNCH\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got.len(), 1, "want 1 record, got {got:?}");
        assert_eq!(got[0].description, "LUNCH");
    }

    #[test]
    fn unreadable_amount_drops_the_record() {
        let text = "D03/14/2025\nTtwelve\nPCOFFEE\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert!(got.is_empty(), "want no records, got {got:?}");
    }

    #[test]
    fn amount_thousands_separators_are_stripped() {
        let text = "D03/14/2025\nT1,250.00\nPACME PAYROLL\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got[0].amount, 1250.0, "got {got:?}");
    }

    #[test]
    fn memo_matching_payee_is_not_appended() {
        let text = "D03/14/2025\nT-1.00\nPCOFFEE\nMCOFFEE\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got[0].description, "COFFEE", "got {got:?}");
    }

    #[test]
    fn memo_without_payee_becomes_description() {
        let text = "D03/14/2025\nT-1.00\nMCARD PURCHASE 1234\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got[0].description, "CARD PURCHASE 1234", "got {got:?}");
    }

    #[test]
    fn empty_payee_line_lets_the_memo_stand_alone() {
        let text = "D03/14/2025\nT-1.00\nP\nMCARD PURCHASE 1234\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got[0].description, "CARD PURCHASE 1234", "got {got:?}");
    }

    #[test]
    fn reparsing_the_same_text_yields_identical_records() {
        let first = parse_qif(SAMPLE_QIF, DateFormat::MonthDayYear);
        let second = parse_qif(SAMPLE_QIF, DateFormat::MonthDayYear);

        assert_eq!(first, second, "want identical records on every parse");
    }

    #[test]
    fn date_format_hint_changes_parsed_dates() {
        let text = "D01/02/2025\nT-1.00\nPCOFFEE\n^\n";

        let month_first = parse_qif(text, DateFormat::MonthDayYear);
        let day_first = parse_qif(text, DateFormat::DayMonthYear);

        assert_eq!(month_first[0].date, "2025-01-02");
        assert_eq!(day_first[0].date, "2025-02-01");
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let text = "D03/14/2025\nT-1.00\nPCOFFEE\nLDining\nC*\n^\n";

        let got = parse_qif(text, DateFormat::MonthDayYear);

        assert_eq!(got.len(), 1, "want 1 record, got {got:?}");
        assert_eq!(got[0].description, "COFFEE");
    }
}
