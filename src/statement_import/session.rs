//! Drives a statement import from file selection through preview to the
//! final save.
//!
//! An [ImportSession] steps through the states of one import:
//!
//! ```text
//! Idle -> FileSelected -> Previewing -> (confirmed or cancelled) -> Idle
//! ```
//!
//! While previewing, the only permitted change is picking a different date
//! format, which re-parses the retained statement text. Confirming runs
//! duplicate detection and categorization over the parsed records and saves
//! the survivors in one atomic batch.

use rusqlite::Connection;
use time::{Date, macros::format_description};

use crate::{
    Error,
    account::{AccountId, get_account},
    category::{Category, CategoryId, get_all_categories},
    statement_import::{
        categorize::{Suggestion, UNCATEGORIZED_NAME, categorize, resolve_category},
        date::DateFormat,
        dedupe::is_duplicate_of_any,
        models::{ImportSummary, ImportedRecord, StatementTransaction},
        statement::parse_statement,
    },
    transaction::{Transaction, get_transaction_history, insert_transaction_batch},
};

/// The names tried, in order, when looking for a stored category to file
/// uncategorizable transactions under.
const FALLBACK_CATEGORY_NAMES: &[&str] = &[UNCATEGORIZED_NAME, "Uncategorized", "Misc"];

/// A statement import in progress.
///
/// Sessions are cheap to build and are not stored between requests: the web
/// layer reconstructs one from the posted form on every request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImportSession {
    /// No statement file has been chosen.
    #[default]
    Idle,
    /// A statement file has been read into memory but not parsed yet.
    FileSelected {
        /// The name of the statement file, used to pick a parser.
        file_name: String,
        /// The raw statement text.
        raw_text: String,
    },
    /// Parsed records are being shown to the user for inspection.
    Previewing {
        /// The name of the statement file.
        file_name: String,
        /// The raw statement text, retained so the records can be re-parsed
        /// under a different date format.
        raw_text: String,
        /// The date format the records were parsed with.
        date_format: DateFormat,
        /// The parsed records.
        records: Vec<StatementTransaction>,
    },
}

/// A record that passed duplicate detection and categorization and is ready
/// to save.
#[derive(Debug, Clone)]
struct QueuedRecord {
    record: StatementTransaction,
    category_id: CategoryId,
    category_name: String,
    group_name: String,
}

impl ImportSession {
    /// Create a session with no statement selected.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Take a statement file into the session.
    ///
    /// # Errors
    ///
    /// Returns [Error::ImportInProgress] when a statement has already been
    /// selected.
    pub fn select_file(&mut self, file_name: &str, raw_text: &str) -> Result<(), Error> {
        match self {
            Self::Idle => {
                *self = Self::FileSelected {
                    file_name: file_name.to_owned(),
                    raw_text: raw_text.to_owned(),
                };

                Ok(())
            }
            _ => Err(Error::ImportInProgress),
        }
    }

    /// Parse the selected statement and move to the preview state.
    ///
    /// # Errors
    ///
    /// Returns [Error::NoStatementSelected] when no file has been selected
    /// and [Error::ImportInProgress] when the session is already
    /// previewing. Parse errors from [parse_statement] are passed through,
    /// and return the session to [ImportSession::Idle] so the user can pick
    /// a different file.
    pub fn preview(&mut self, date_format: DateFormat) -> Result<(), Error> {
        match self {
            Self::Idle => Err(Error::NoStatementSelected),
            Self::Previewing { .. } => Err(Error::ImportInProgress),
            Self::FileSelected {
                file_name,
                raw_text,
            } => match parse_statement(file_name, raw_text, date_format) {
                Ok(records) => {
                    tracing::debug!("Parsed {} records from '{file_name}'", records.len());

                    *self = Self::Previewing {
                        file_name: std::mem::take(file_name),
                        raw_text: std::mem::take(raw_text),
                        date_format,
                        records,
                    };

                    Ok(())
                }
                Err(error) => {
                    *self = Self::Idle;
                    Err(error)
                }
            },
        }
    }

    /// Re-parse the retained statement text with a different date format.
    ///
    /// # Errors
    ///
    /// Returns [Error::NoStatementSelected] unless the session is
    /// previewing.
    pub fn set_date_format(&mut self, date_format: DateFormat) -> Result<(), Error> {
        match self {
            Self::Previewing {
                file_name,
                raw_text,
                date_format: current_format,
                records,
            } => {
                let reparsed = parse_statement(file_name, raw_text, date_format)?;

                *current_format = date_format;
                *records = reparsed;

                Ok(())
            }
            _ => Err(Error::NoStatementSelected),
        }
    }

    /// The parsed records held for preview. Empty unless the session is
    /// previewing.
    pub fn records(&self) -> &[StatementTransaction] {
        match self {
            Self::Previewing { records, .. } => records,
            _ => &[],
        }
    }

    /// The name of the selected statement file, if one has been selected.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::FileSelected { file_name, .. } | Self::Previewing { file_name, .. } => {
                Some(file_name)
            }
        }
    }

    /// The retained raw statement text, if a file has been selected.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::FileSelected { raw_text, .. } | Self::Previewing { raw_text, .. } => {
                Some(raw_text)
            }
        }
    }

    /// Discard the import without saving anything.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    /// Check the previewed records against existing transactions, file them
    /// under categories, and save the survivors in one atomic batch.
    ///
    /// `account_selection` is the raw value of the account picker. The
    /// placeholder value `all` is rejected before any other work happens,
    /// because imported transactions must belong to a single account.
    ///
    /// On success the session returns to [ImportSession::Idle]. On failure
    /// it stays in the preview state so the user can adjust and retry.
    ///
    /// # Errors
    ///
    /// Returns [Error::NoStatementSelected] unless the session is
    /// previewing, [Error::NoAccountSelected] when `account_selection` is
    /// not a specific account, [Error::NotFound] when the account does not
    /// exist, and [Error::InvalidDate] when a queued record carries a date
    /// that is not a real calendar day. In every error case nothing is
    /// saved.
    pub fn confirm(
        &mut self,
        account_selection: &str,
        connection: &Connection,
    ) -> Result<ImportSummary, Error> {
        let Self::Previewing { records, .. } = self else {
            return Err(Error::NoStatementSelected);
        };

        // Reject the "all accounts" placeholder before doing any work.
        let account_id: AccountId = match account_selection.trim() {
            "" | "all" => return Err(Error::NoAccountSelected),
            value => value.parse().map_err(|_| Error::NoAccountSelected)?,
        };
        let account = get_account(account_id, connection)?;

        let history = get_transaction_history(connection)?;
        let categories = get_all_categories(connection)?;
        let fallback_category = find_fallback_category(&categories);

        let mut duplicates = 0;
        let mut skipped = 0;
        let mut queued = Vec::new();

        for record in records.iter() {
            if is_duplicate_of_any(record, &history) {
                duplicates += 1;
                continue;
            }

            let suggestion = categorize(&record.description, &history, &categories);

            let (category_id, category_name, group_name) = match suggestion {
                Suggestion {
                    category_id: Some(id),
                    group_name,
                    category_name,
                } => (id, category_name, group_name),
                // No stored category matched. Fall back to the catch-all
                // category if the user has one, otherwise drop the record.
                Suggestion {
                    category_id: None, ..
                } => match fallback_category {
                    Some(category) => (
                        category.id,
                        category.name.as_ref().to_owned(),
                        category.group_name.clone(),
                    ),
                    None => {
                        skipped += 1;
                        continue;
                    }
                },
            };

            queued.push(QueuedRecord {
                record: record.clone(),
                category_id,
                category_name,
                group_name,
            });
        }

        // Saved rows must carry real calendar dates. The parsers only check
        // component ranges, so a date like February 30th can survive this
        // far; one bad date fails the whole batch rather than saving a
        // partial import.
        let iso_date = format_description!("[year]-[month]-[day]");
        let mut batch = Vec::with_capacity(queued.len());

        for queued_record in &queued {
            let date = Date::parse(&queued_record.record.date, iso_date)
                .map_err(|_| Error::InvalidDate(queued_record.record.date.clone()))?;

            batch.push(
                Transaction::build(
                    queued_record.record.amount,
                    date,
                    &queued_record.record.description,
                    account_id,
                )
                .category_id(queued_record.category_id),
            );
        }

        insert_transaction_batch(batch, connection)?;

        let summary = ImportSummary {
            imported: queued.len(),
            duplicates,
            skipped,
            total: records.len(),
            records: queued
                .into_iter()
                .map(|queued_record| ImportedRecord {
                    date: queued_record.record.date,
                    amount: queued_record.record.amount,
                    description: queued_record.record.description,
                    category_name: queued_record.category_name,
                    group_name: queued_record.group_name,
                })
                .collect(),
        };

        tracing::info!(
            "Imported {} of {} statement records into account '{}' ({} duplicates, {} skipped)",
            summary.imported,
            summary.total,
            account.name,
            summary.duplicates,
            summary.skipped
        );

        *self = Self::Idle;

        Ok(summary)
    }
}

/// The category used for records the categorizer could not match, if the
/// user has a suitable catch-all category.
fn find_fallback_category(categories: &[Category]) -> Option<&Category> {
    FALLBACK_CATEGORY_NAMES
        .iter()
        .find_map(|name| resolve_category(name, categories))
}
