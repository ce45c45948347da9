//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::{UserID, ensure_owner},
    category::CategoryId,
    database_id::DatabaseId,
    transaction::DateRange,
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// Serialized as `"INCOME"`/`"EXPENSE"`; the lowercase forms are also accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money earned.
    #[serde(alias = "income")]
    Income,
    /// Money spent.
    #[serde(alias = "expense")]
    Expense,
}

impl TransactionType {
    /// The name stored in the database and used in the API.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction type {other:?}").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is never negative, the direction is given by `transaction_type`.
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserID,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub title: String,
    pub category_id: Option<CategoryId>,
    pub date: Date,
    pub note: Option<String>,
    pub image_url: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        date: Date,
        title: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            date,
            title: title.to_owned(),
            category_id: None,
            note: None,
            image_url: None,
        }
    }
}

/// A builder for creating or replacing [Transaction]s.
///
/// Call [TransactionBuilder::validate] before writing it to the database.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub transaction_type: TransactionType,
    /// The magnitude of the transaction, e.g. `45.99` for a coffee shop purchase.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A short description, e.g. "Salary - January 2025".
    pub title: String,
    pub category_id: Option<CategoryId>,
    pub note: Option<String>,
    pub image_url: Option<String>,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set a free-text note for the transaction.
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Attach a receipt image URL.
    pub fn image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    /// Trim text fields and check the amount.
    ///
    /// # Errors
    ///
    /// Returns [Error::ValidationError] if the title is blank or the amount is
    /// not a finite number greater than zero.
    pub fn validate(mut self) -> Result<Self, Error> {
        self.title = self.title.trim().to_owned();
        if self.title.is_empty() {
            return Err(Error::ValidationError("title is required".to_owned()));
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::ValidationError(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }

        self.note = non_blank(self.note);
        self.image_url = non_blank(self.image_url);

        Ok(self)
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Filters for listing a user's transactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionFilter {
    /// Inclusive date range.
    pub range: DateRange,
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<CategoryId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction for `user_id` in the database from a builder.
///
/// The caller should validate the builder and check that the category belongs to the user.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = builder.category_id;

    connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, type, amount, title, category_id, date, note, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, type, amount, title, category_id, date, note, image_url",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.transaction_type,
                builder.amount,
                builder.title,
                builder.category_id,
                builder.date,
                builder.note,
                builder.image_url,
            ),
            map_transaction_row,
        )
        .map_err(|error| map_foreign_key_error(error, category_id))
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, type, amount, title, category_id, date, note, image_url
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve a transaction that must belong to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if it does not exist or [Error::Forbidden] if
/// another user owns it.
pub fn get_owned_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = get_transaction(id, connection)?;
    ensure_owner(transaction.user_id, user_id)?;

    Ok(transaction)
}

/// Get a user's transactions matching `filter`, newest first.
pub fn query_transactions(
    user_id: UserID,
    filter: TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // Sort by date, and then ID to keep transaction order stable after updates
    connection
        .prepare(
            "SELECT id, user_id, type, amount, title, category_id, date, note, image_url
             FROM \"transaction\"
             WHERE user_id = ?1
               AND date BETWEEN ?2 AND ?3
               AND (?4 IS NULL OR type = ?4)
               AND (?5 IS NULL OR category_id = ?5)
             ORDER BY date DESC, id DESC",
        )?
        .query_map(
            (
                user_id.as_i64(),
                filter.range.start,
                filter.range.end,
                filter.transaction_type,
                filter.category_id,
            ),
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Replace the fields of the transaction `id` with those in `builder`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or
/// [Error::InvalidCategory] if the category does not exist.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = builder.category_id;

    connection
        .prepare(
            "UPDATE \"transaction\"
             SET type = ?1, amount = ?2, title = ?3, category_id = ?4, date = ?5,
                 note = ?6, image_url = ?7
             WHERE id = ?8
             RETURNING id, user_id, type, amount, title, category_id, date, note, image_url",
        )?
        .query_row(
            (
                builder.transaction_type,
                builder.amount,
                builder.title,
                builder.category_id,
                builder.date,
                builder.note,
                builder.image_url,
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| map_foreign_key_error(error, category_id))
}

/// Delete the transaction `id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                amount REAL NOT NULL CHECK (amount >= 0),
                title TEXT NOT NULL,
                category_id INTEGER REFERENCES category(id) ON DELETE SET NULL,
                date TEXT NOT NULL,
                note TEXT,
                image_url TEXT
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type: row.get(2)?,
        amount: row.get(3)?,
        title: row.get(4)?,
        category_id: row.get(5)?,
        date: row.get(6)?,
        note: row.get(7)?,
        image_url: row.get(8)?,
    })
}

fn map_foreign_key_error(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match (error, category_id) {
        (
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ),
            Some(category_id),
        ) => Error::InvalidCategory(category_id),
        (error, _) => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
