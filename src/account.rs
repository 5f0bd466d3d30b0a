//! Bank accounts and their persistence.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The id of an account stored in the database.
pub type AccountId = i64;

/// The accounts inserted on first run.
const DEFAULT_ACCOUNTS: &[&str] = &["Checking", "Savings"];

/// A bank account that statements are imported into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id of the account in the database.
    pub id: AccountId,
    /// The display name of the account, e.g. "Everyday Checking".
    pub name: String,
}

/// Save a new account in the database.
///
/// # Errors
///
/// Returns [Error::DuplicateAccountName] when an account with `name`
/// already exists.
pub fn create_account(name: &str, connection: &Connection) -> Result<Account, Error> {
    let id = connection
        .query_row(
            "INSERT INTO account (name) VALUES (?1) RETURNING id",
            [name],
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sqlite_error, _)
                if sqlite_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateAccountName(name.to_owned())
            }
            error => error.into(),
        })?;

    Ok(Account {
        id,
        name: name.to_owned(),
    })
}

/// Retrieve the account with `account_id` from the database.
///
/// # Errors
///
/// Returns [Error::NotFound] when no account has that id.
pub fn get_account(account_id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, name FROM account WHERE id = ?1",
            [account_id],
            map_account_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all accounts from the database, ordered by name.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name FROM account ORDER BY name ASC")?
        .query_map([], map_account_row)?
        .map(|account_result| account_result.map_err(|error| error.into()))
        .collect()
}

/// Insert the starter accounts on first run.
///
/// Does nothing when any accounts already exist. Returns the number of
/// accounts inserted.
pub fn seed_default_accounts(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM account", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(0);
    }

    for name in DEFAULT_ACCOUNTS {
        create_account(name, connection)?;
    }

    Ok(DEFAULT_ACCOUNTS.len())
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;

    Ok(Account { id, name })
}

/// Create the account table in the database.
pub(crate) fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod account_query_tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{
        create_account, get_account, get_all_accounts, seed_default_accounts,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().expect("could not open database in memory");
        initialize(&connection).expect("could not initialize database");

        connection
    }

    #[test]
    fn create_then_get_round_trips() {
        let connection = get_test_connection();

        let created = create_account("Everyday Checking", &connection).unwrap();
        let got = get_account(created.id, &connection).unwrap();

        assert_eq!(got, created, "want {created:?}, got {got:?}");
    }

    #[test]
    fn create_rejects_duplicate_name() {
        let connection = get_test_connection();
        create_account("Checking", &connection).unwrap();

        let got = create_account("Checking", &connection);

        assert_eq!(got, Err(Error::DuplicateAccountName("Checking".to_owned())));
    }

    #[test]
    fn get_missing_account_is_not_found() {
        let connection = get_test_connection();

        let got = get_account(999, &connection);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn get_all_orders_by_name() {
        let connection = get_test_connection();
        create_account("Savings", &connection).unwrap();
        create_account("Checking", &connection).unwrap();

        let got = get_all_accounts(&connection).unwrap();

        let names: Vec<&str> = got.iter().map(|account| account.name.as_str()).collect();
        assert_eq!(names, vec!["Checking", "Savings"], "got {names:?}");
    }

    #[test]
    fn seed_populates_empty_table_once() {
        let connection = get_test_connection();

        let first = seed_default_accounts(&connection).unwrap();
        let second = seed_default_accounts(&connection).unwrap();

        assert!(first > 0, "want seeded accounts, got {first}");
        assert_eq!(second, 0, "second seed should be a no-op, got {second}");
    }
}
