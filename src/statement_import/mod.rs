//! Importing bank statements into the budgeting application.
//!
//! This module contains everything related to statement imports:
//! - Parsers for the QIF and OFX statement formats
//! - Date normalization for the ambiguous formats banks use
//! - Duplicate detection against saved transactions
//! - Category suggestions for unseen merchants
//! - The `ImportSession` state machine that drives an import
//! - The import page and its preview and confirm endpoints

mod alert;
mod categorize;
mod date;
mod dedupe;
mod import_page;
mod import_transactions;
mod keywords;
mod models;
mod ofx;
mod preview;
mod qif;
mod scan;
mod session;
mod statement;

pub use categorize::{Suggestion, UNCATEGORIZED_GROUP, UNCATEGORIZED_NAME, categorize};
pub use date::{DateFormat, normalize_date};
pub use dedupe::{is_duplicate, is_duplicate_of_any};
pub use import_page::get_import_page;
pub use import_transactions::{ImportState, import_transactions};
pub use models::{ImportSummary, ImportedRecord, StatementTransaction};
pub use ofx::parse_ofx;
pub use preview::preview_transactions;
pub use qif::parse_qif;
pub use session::ImportSession;
pub use statement::parse_statement;
