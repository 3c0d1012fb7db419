//! Defines the core data model and database functions for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use crate::{Error, database_id::DatabaseId};

// ============================================================================
// MODELS
// ============================================================================

/// A product sale, or a listing that has not sold yet if it has no sale date.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// The name of the product.
    pub title: String,
    /// A free text description of the product.
    pub description: String,
    /// The price the product sold for.
    pub price: f64,
    /// When the product was sold, normalised to UTC.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_of_sale: Option<OffsetDateTime>,
    /// The category label of the product, e.g. "electronics".
    pub category: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(title: &str, price: f64) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            description: String::new(),
            price,
            date_of_sale: None,
            category: String::new(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// This is also the shape of a record in the seed feed, so feed records are
/// deserialized straight into a builder. Fields of the feed that are not
/// listed here (e.g. `id`, `image` or `sold`) are ignored.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// use crate::transaction::{Transaction, create_transaction};
///
/// let transaction = create_transaction(
///     Transaction::build("Blue Widget", 49.95)
///         .description("A widget, but blue")
///         .date_of_sale(Some(datetime!(2022-03-15 10:00 UTC)))
///         .category("gadgets"),
///     &connection,
/// )?;
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBuilder {
    /// The name of the product. Required.
    pub title: String,

    /// A free text description of the product, defaults to an empty string.
    #[serde(default)]
    pub description: String,

    /// The price the product sold for. Required.
    pub price: f64,

    /// When the product was sold.
    ///
    /// The feed gives sale dates as RFC 3339 timestamps with an offset, e.g.
    /// "2021-11-27T20:29:54+05:30". Dates are stored in UTC, so the month of a
    /// sale is the month of the instant in UTC.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_of_sale: Option<OffsetDateTime>,

    /// The category label of the product, defaults to an empty string.
    #[serde(default)]
    pub category: String,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the sale date for the transaction.
    pub fn date_of_sale(mut self, date_of_sale: Option<OffsetDateTime>) -> Self {
        self.date_of_sale = date_of_sale;
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDate] if the sale date cannot be written as an RFC 3339 timestamp,
/// - or [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let date_of_sale = builder.date_of_sale.map(format_sale_date).transpose()?;

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (title, description, price, date_of_sale, category)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, title, description, price, date_of_sale, category",
        )?
        .query_row(
            (
                builder.title,
                builder.description,
                builder.price,
                date_of_sale,
                builder.category,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
        row.get(0)
    })?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                date_of_sale TEXT,
                category TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT INTO sqlite_sequence (name, seq)
         SELECT 'transaction', 0
         WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'transaction')",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns id, title, description, price,
/// date_of_sale and category, in that order.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let description = row.get(2)?;
    let price = row.get(3)?;
    let date_of_sale: Option<String> = row.get(4)?;
    let category = row.get(5)?;

    let date_of_sale = date_of_sale
        .map(|text| OffsetDateTime::parse(&text, &Rfc3339))
        .transpose()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id,
        title,
        description,
        price,
        date_of_sale,
        category,
    })
}

/// Format a sale date the way it is stored, as an RFC 3339 timestamp in UTC.
///
/// SQLite's date functions understand this format, which is what the month
/// filter relies on.
fn format_sale_date(date: OffsetDateTime) -> Result<String, Error> {
    date.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidDate(error.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================
