//! Spending categories and their persistence.
//!
//! Categories are grouped labels such as "Groceries" in the group "Food".
//! Imported transactions are filed under a category so that spending can be
//! totalled by group later.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The id of a category stored in the database.
pub type CategoryId = i64;

/// The categories inserted on first run, as (name, group name) pairs.
///
/// The names line up with the labels produced by the built-in keyword rules
/// so that keyword suggestions resolve to stored categories out of the box.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Subscriptions", "Technology"),
    ("Takeaway", "Food"),
    ("Dining Out", "Food"),
    ("Groceries", "Food"),
    ("Shopping", "Shopping"),
    ("Transport", "Transportation"),
    ("Utilities", "Home"),
    ("Rent", "Home"),
    ("Medical", "Health"),
    ("Fitness", "Health"),
    ("Entertainment", "Entertainment"),
    ("Insurance", "Financial"),
    ("Bank Fees", "Financial"),
    ("Salary", "Income"),
    ("Transfer", "Transfers"),
    ("Uncategorized", "Misc"),
];

/// The name of a category.
///
/// The inner string is guaranteed to be non-empty with the whitespace
/// trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name`.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryName] when `name` is empty or all
    /// whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyCategoryName);
        }

        Ok(Self(name.to_owned()))
    }

    /// Create a category name without validation.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`: an
    /// invalid name will not affect memory safety, only produce a confusing
    /// category list.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::new(name)
    }
}

/// A category that transactions can be filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The id of the category in the database.
    pub id: CategoryId,
    /// The name of the category.
    pub name: CategoryName,
    /// The name of the group the category belongs to.
    pub group_name: String,
}

/// Save a new category in the database.
pub fn create_category(
    name: CategoryName,
    group_name: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    let id = connection.query_row(
        "INSERT INTO category (name, group_name) VALUES (?1, ?2) RETURNING id",
        (name.as_ref(), group_name),
        |row| row.get(0),
    )?;

    Ok(Category {
        id,
        name,
        group_name: group_name.to_owned(),
    })
}

/// Retrieve all categories from the database, ordered by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, group_name FROM category ORDER BY name ASC")?
        .query_map([], map_category_row)?
        .map(|category_result| category_result.map_err(|error| error.into()))
        .collect()
}

/// Insert the built-in category set on first run.
///
/// Does nothing when any categories already exist, so user edits survive
/// restarts. Returns the number of categories inserted.
pub fn seed_default_categories(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM category", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(0);
    }

    let transaction = connection.unchecked_transaction()?;

    {
        let mut statement =
            transaction.prepare("INSERT INTO category (name, group_name) VALUES (?1, ?2)")?;

        for (name, group_name) in DEFAULT_CATEGORIES {
            statement.execute((name, group_name))?;
        }
    }

    transaction.commit()?;

    Ok(DEFAULT_CATEGORIES.len())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let group_name = row.get(2)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        group_name,
    })
}

/// Create the category table in the database.
pub(crate) fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                group_name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )
}
