//! Defines the route handler for the paginated, searchable transaction listing.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    month::SaleMonth,
    pagination::{PageRequest, PaginationConfig},
};

use super::query::{TransactionFilter, TransactionPage, query_transactions};

/// The raw query parameters for listing transactions.
///
/// Values are kept as strings so that malformed numbers are reported through
/// [Error] like every other bad request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    /// The 1-based page number, defaults to [PaginationConfig::default_page].
    pub page: Option<String>,
    /// The page size, defaults to [PaginationConfig::default_page_size].
    pub per_page: Option<String>,
    /// Text to look for in the title, description or price.
    pub search: Option<String>,
    /// A two-digit month, e.g. "03", to only list sales from that month.
    pub month: Option<String>,
}

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for querying transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to page the transactions.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// List a page of transactions, optionally filtered by search text and month.
pub async fn get_transactions(
    State(state): State<TransactionsState>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> Result<Json<TransactionPage>, Error> {
    let Query(query) = query?;
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(&query, &state.pagination_config, &connection).map(Json)
}

/// Validate `query` and fetch the page of transactions it asks for.
///
/// Empty `search` and `month` parameters are treated as missing.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidMonth] if the month is not a two-digit month,
/// - [Error::InvalidPagination] if the page or page size is not a positive integer,
/// - or [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    query: &TransactionsQuery,
    pagination_config: &PaginationConfig,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let page_request = PageRequest::from_query(
        query.page.as_deref(),
        query.per_page.as_deref(),
        pagination_config,
    )?;
    let month = query
        .month
        .as_deref()
        .filter(|month| !month.is_empty())
        .map(str::parse::<SaleMonth>)
        .transpose()?;
    let filter = TransactionFilter {
        search: query.search.clone().filter(|search| !search.is_empty()),
        month,
    };

    query_transactions(&filter, page_request, connection)
        .inspect_err(|error| tracing::error!("could not query transactions: {error}"))
}
