//! Sales dashboard is a small web service for browsing sales transactions.
//!
//! This library provides a JSON API over a single SQLite table of transactions
//! that is seeded once from an external feed. Besides a searchable, paginated
//! listing, it serves per-month sale totals, a fixed price-range histogram and a
//! category breakdown.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod error;
mod month;
mod not_found;
mod pagination;
mod routing;
mod seed;
mod statistics;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use month::SaleMonth;
pub use pagination::{PageRequest, Pagination, PaginationConfig};
pub use routing::build_router;
pub use seed::{DEFAULT_FEED_URL, SeedReport, fetch_feed, seed_if_empty, seed_transactions};
pub use statistics::{
    CategoryCount, CombinedData, PRICE_BUCKETS, PriceBucket, PriceRangeCount, SaleStatistics,
    category_breakdown, compute_sale_statistics, price_histogram,
};
pub use transaction::{
    Transaction, TransactionBuilder, TransactionFilter, TransactionPage, count_transactions,
    create_transaction, get_transactions_in_month, query_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
