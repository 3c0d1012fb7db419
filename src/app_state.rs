//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{Error, db::initialize, pagination::PaginationConfig};

/// The state of the REST server.
///
/// The database connection is created by the caller and handed to every
/// request handler through this state, handlers never open their own.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The config that controls how to page transaction listings.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, pagination_config: PaginationConfig) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

/// Acquire the database lock, logging the failure if the lock is poisoned.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub(crate) fn lock_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use rusqlite::Connection;

    use crate::{Error, pagination::PaginationConfig};

    use super::{AppState, lock_connection};

    #[test]
    fn lock_connection_succeeds() {
        let state = AppState::new(Connection::open_in_memory().unwrap(), PaginationConfig::default())
            .unwrap();

        assert!(lock_connection(&state.db_connection).is_ok());
    }

    #[test]
    fn poisoned_lock_gives_lock_error() {
        let state = AppState::new(Connection::open_in_memory().unwrap(), PaginationConfig::default())
            .unwrap();
        let db_connection = Arc::clone(&state.db_connection);

        let _ = thread::spawn(move || {
            let _guard = db_connection.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            lock_connection(&state.db_connection),
            Err(Error::DatabaseLockError)
        ));
    }
}
