//! Database queries for listing transactions and selecting a month's sales.

use rusqlite::{Connection, named_params};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    month::SaleMonth,
    pagination::{PageRequest, Pagination},
};

use super::core::{Transaction, map_transaction_row};

/// Restricts which transactions a listing returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive text that must appear in the title, description or price.
    ///
    /// Matched literally, `%` and `_` are not wildcards.
    pub search: Option<String>,
    /// Only list transactions sold in this month.
    pub month: Option<SaleMonth>,
}

/// One page of transactions and the details needed to fetch the other pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    /// The transactions on this page, in order of increasing ID.
    pub transactions: Vec<Transaction>,
    /// Where this page sits in the filtered result set.
    pub pagination: Pagination,
}

// Each filter is disabled by binding NULL to its parameter, so the query text never changes.
// Whole prices are matched as written, e.g. "44" rather than "44.0".
const FILTER_CLAUSE: &str = r"
    (:pattern IS NULL
        OR title LIKE :pattern ESCAPE '\'
        OR description LIKE :pattern ESCAPE '\'
        OR (CASE WHEN price = CAST(price AS INTEGER)
                THEN CAST(CAST(price AS INTEGER) AS TEXT)
                ELSE CAST(price AS TEXT)
            END) LIKE :pattern ESCAPE '\')
    AND (:month IS NULL OR strftime('%m', date_of_sale) = :month)";

/// Get a page of the transactions matching `filter`, and the total number of matches.
///
/// Transactions are ordered by ID, so concatenating consecutive pages
/// reproduces the whole filtered set.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn query_transactions(
    filter: &TransactionFilter,
    page_request: PageRequest,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let pattern = filter
        .search
        .as_deref()
        .filter(|search| !search.is_empty())
        .map(like_pattern);
    let month = filter.month.map(SaleMonth::as_query_value);
    let limit = i64::try_from(page_request.per_page).unwrap_or(i64::MAX);
    let offset = i64::try_from(page_request.offset()).unwrap_or(i64::MAX);

    let transactions = connection
        .prepare(&format!(
            "SELECT id, title, description, price, date_of_sale, category
             FROM \"transaction\"
             WHERE {FILTER_CLAUSE}
             ORDER BY id ASC
             LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            named_params! {
                ":pattern": pattern,
                ":month": month,
                ":limit": limit,
                ":offset": offset,
            },
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM \"transaction\" WHERE {FILTER_CLAUSE}"),
        named_params! {
            ":pattern": pattern,
            ":month": month,
        },
        |row| row.get(0),
    )?;

    Ok(TransactionPage {
        transactions,
        pagination: Pagination {
            page: page_request.page,
            per_page: page_request.per_page,
            total: u64::try_from(total).unwrap_or_default(),
        },
    })
}

/// Get every transaction sold in `month` of any year, in order of increasing ID.
///
/// Transactions without a sale date never match.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions_in_month(
    month: SaleMonth,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, title, description, price, date_of_sale, category
             FROM \"transaction\"
             WHERE strftime('%m', date_of_sale) = :month
             ORDER BY id ASC",
        )?
        .query_map(
            named_params! { ":month": month.as_query_value() },
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Count the transactions that have no sale date, i.e. the items not sold yet.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_transactions_without_sale_date(connection: &Connection) -> Result<u64, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE date_of_sale IS NULL",
        [],
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Wrap `search` in wildcards, escaping the characters `LIKE` treats specially.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');

    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}
