//! The data types that flow through the statement import pipeline.

/// A transaction parsed from a bank statement file.
///
/// This is an unsaved, intermediate record. The date is kept as a `YYYY-MM-DD`
/// string until the import is confirmed so that records parsed from malformed
/// statements can still be previewed and compared against existing
/// transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementTransaction {
    /// The transaction date as a `YYYY-MM-DD` string.
    pub date: String,
    /// The transaction amount. Negative amounts are debits.
    pub amount: f64,
    /// A description of the transaction, e.g. the payee or memo text.
    pub description: String,
    /// The cheque or reference number, if the statement provided one.
    pub check_number: Option<String>,
}

/// A statement transaction that was queued for persistence, annotated with
/// the category that was applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRecord {
    /// The transaction date as a `YYYY-MM-DD` string.
    pub date: String,
    /// The transaction amount.
    pub amount: f64,
    /// A description of the transaction.
    pub description: String,
    /// The name of the category the transaction was filed under.
    pub category_name: String,
    /// The name of the group the category belongs to.
    pub group_name: String,
}

/// The outcome of a confirmed statement import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    /// How many transactions were saved.
    pub imported: usize,
    /// How many transactions were dropped as duplicates of existing
    /// transactions.
    pub duplicates: usize,
    /// How many transactions were dropped because no category could be
    /// applied to them.
    pub skipped: usize,
    /// How many transactions were parsed from the statement file.
    pub total: usize,
    /// The transactions that were saved, in statement order.
    pub records: Vec<ImportedRecord>,
}
