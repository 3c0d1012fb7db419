//! Seeds the transaction table from the third-party product feed.
//!
//! The feed is fetched once at startup. Its records are then inserted
//! concurrently, each insert in its own blocking task, and every insert reports
//! its own result so that one bad record does not stop the others.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde_json::Value;
use tokio::task::JoinSet;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    transaction::{Transaction, TransactionBuilder, count_transactions, create_transaction},
};

/// Where the product transactions are fetched from when no other URL is given.
pub const DEFAULT_FEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// The outcome of seeding the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// The number of feed records that were inserted.
    pub inserted: usize,
    /// The number of feed records that were skipped because of an error.
    pub failed: usize,
}

/// Fetch the raw records of the product feed at `url`.
///
/// Records are returned as raw JSON so that each one can be validated on its
/// own while seeding.
///
/// # Errors
/// Returns [Error::FeedUnavailable] if the request fails, the server responds
/// with an error status, or the body is not a JSON array.
pub async fn fetch_feed(url: &str) -> Result<Vec<Value>, Error> {
    tracing::info!(url = %url, "Fetching seed feed");

    let records: Vec<Value> = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|error| Error::FeedUnavailable(error.to_string()))?
        .json()
        .await
        .map_err(|error| Error::FeedUnavailable(error.to_string()))?;

    tracing::debug!(count = records.len(), "Fetched seed feed");

    Ok(records)
}

/// Insert every record of the feed into the database.
///
/// The inserts run concurrently with no ordering guarantee and no enclosing
/// SQL transaction. A record that cannot be parsed or inserted is logged and
/// counted in [SeedReport::failed], and seeding carries on.
pub async fn seed_transactions(
    records: Vec<Value>,
    db_connection: Arc<Mutex<Connection>>,
) -> SeedReport {
    let mut tasks = JoinSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let db_connection = db_connection.clone();
        tasks.spawn_blocking(move || (index, insert_feed_record(record, &db_connection)));
    }

    let mut report = SeedReport::default();

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok((_, Ok(_))) => report.inserted += 1,
            Ok((index, Err(error))) => {
                tracing::warn!("skipping feed record {index}: {error}");
                report.failed += 1;
            }
            Err(error) => {
                tracing::error!("seed task did not finish: {error}");
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        inserted = report.inserted,
        failed = report.failed,
        "Finished seeding transactions"
    );

    report
}

/// Seed the database from the feed at `feed_url`, unless an earlier run already did.
///
/// Returns `None` without touching the feed if the database already holds
/// transactions. An empty feed is not an error, the database simply stays empty.
///
/// # Errors
/// This function will return a:
/// - [Error::FeedUnavailable] if the feed cannot be fetched,
/// - [Error::DatabaseLockError] if the database lock is poisoned,
/// - or [Error::SqlError] if the existing transactions cannot be counted.
pub async fn seed_if_empty(state: &AppState, feed_url: &str) -> Result<Option<SeedReport>, Error> {
    let existing = {
        let connection = lock_connection(&state.db_connection)?;
        count_transactions(&connection)?
    };

    if existing > 0 {
        tracing::info!("Database already holds {existing} transactions, skipping seed");
        return Ok(None);
    }

    let records = fetch_feed(feed_url).await?;

    Ok(Some(seed_transactions(records, state.db_connection.clone()).await))
}

fn insert_feed_record(
    record: Value,
    db_connection: &Mutex<Connection>,
) -> Result<Transaction, Error> {
    let builder: TransactionBuilder = serde_json::from_value(record)
        .map_err(|error| Error::InvalidFeedRecord(error.to_string()))?;

    let connection = lock_connection(db_connection)?;

    create_transaction(builder, &connection)
}
