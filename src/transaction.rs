//! Transactions and their persistence.
//!
//! This module contains the [Transaction] model, the [TransactionBuilder]
//! for creating transactions, and the database functions the statement
//! import pipeline relies on.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, account::AccountId, category::CategoryId};

/// The id of a transaction stored in the database.
pub type TransactionId = i64;

/// A transaction that has been saved to the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The id of the transaction in the database.
    pub id: TransactionId,
    /// The id of the account the transaction belongs to.
    pub account_id: AccountId,
    /// The id of the category the transaction is filed under, if any.
    pub category_id: Option<CategoryId>,
    /// The amount of money spent or earned. Negative amounts are debits.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A description of the transaction, e.g. the payee shown on the
    /// statement.
    pub description: String,
    /// Whether the transaction has not yet settled.
    pub is_pending: bool,
}

impl Transaction {
    /// Create a builder for a transaction.
    pub fn build(
        amount: f64,
        date: Date,
        description: &str,
        account_id: AccountId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            account_id,
            category_id: None,
            is_pending: false,
        }
    }
}

/// Holds the data needed to save a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    amount: f64,
    date: Date,
    description: String,
    account_id: AccountId,
    category_id: Option<CategoryId>,
    is_pending: bool,
}

impl TransactionBuilder {
    /// File the transaction under a category.
    pub fn category_id(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Mark whether the transaction has settled.
    pub fn is_pending(mut self, is_pending: bool) -> Self {
        self.is_pending = is_pending;
        self
    }
}

/// A saved transaction as seen by the statement import pipeline, joined with
/// its category labels.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The transaction date as a `YYYY-MM-DD` string.
    pub date: String,
    /// The transaction amount.
    pub amount: f64,
    /// A description of the transaction.
    pub description: String,
    /// The id of the category the transaction is filed under, if any.
    pub category_id: Option<CategoryId>,
    /// The name of that category.
    pub category_name: Option<String>,
    /// The name of the group that category belongs to.
    pub group_name: Option<String>,
}

/// Save a transaction in the database.
///
/// # Errors
///
/// Returns [Error::InvalidTransactionReference] when the account or
/// category the transaction refers to does not exist.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let id = connection
        .query_row(
            "INSERT INTO \"transaction\" (account_id, category_id, amount, date, description, is_pending)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING id",
            (
                builder.account_id,
                builder.category_id,
                builder.amount,
                builder.date,
                &builder.description,
                builder.is_pending,
            ),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sqlite_error, _)
                if sqlite_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::InvalidTransactionReference
            }
            error => error.into(),
        })?;

    Ok(Transaction {
        id,
        account_id: builder.account_id,
        category_id: builder.category_id,
        amount: builder.amount,
        date: builder.date,
        description: builder.description,
        is_pending: builder.is_pending,
    })
}

/// Save a batch of transactions inside a single database transaction.
///
/// Either every row is saved or, if any insert fails, none are. Returns the
/// number of transactions saved.
pub fn insert_transaction_batch(
    builders: Vec<TransactionBuilder>,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;
    let count = builders.len();

    {
        let mut statement = transaction.prepare(
            "INSERT INTO \"transaction\" (account_id, category_id, amount, date, description, is_pending)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for builder in &builders {
            statement
                .execute((
                    builder.account_id,
                    builder.category_id,
                    builder.amount,
                    builder.date,
                    &builder.description,
                    builder.is_pending,
                ))
                .map_err(|error| match error {
                    rusqlite::Error::SqliteFailure(sqlite_error, _)
                        if sqlite_error.extended_code
                            == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
                    {
                        Error::InvalidTransactionReference
                    }
                    error => error.into(),
                })?;
        }
    }

    transaction.commit()?;

    Ok(count)
}

/// Retrieve settled transactions with their category labels, ordered most
/// recent first.
///
/// Pending transactions are excluded so that category suggestions and
/// duplicate checks only consider settled history.
pub fn get_transaction_history(connection: &Connection) -> Result<Vec<HistoryEntry>, Error> {
    connection
        .prepare(
            "SELECT t.date, t.amount, t.description, c.id, c.name, c.group_name
                FROM \"transaction\" t
                LEFT JOIN category c ON t.category_id = c.id
                WHERE t.is_pending = 0
                ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map([], map_history_row)?
        .map(|entry_result| entry_result.map_err(|error| error.into()))
        .collect()
}

fn map_history_row(row: &Row) -> Result<HistoryEntry, rusqlite::Error> {
    let date = row.get(0)?;
    let amount = row.get(1)?;
    let description = row.get(2)?;
    let category_id = row.get(3)?;
    let category_name = row.get(4)?;
    let group_name = row.get(5)?;

    Ok(HistoryEntry {
        date,
        amount,
        description,
        category_id,
        category_name,
        group_name,
    })
}

/// Create the transaction table in the database.
pub(crate) fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE,
                category_id INTEGER REFERENCES category(id) ON DELETE SET NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                is_pending INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
    )
}
