//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A month parameter was not a two-digit month between "01" and "12".
    #[error("\"{0}\" is not a valid two-digit month")]
    InvalidMonth(String),

    /// A pagination query parameter was missing a sensible value, e.g. page 0
    /// or a non-numeric page size.
    #[error("invalid pagination parameter: {0}")]
    InvalidPagination(String),

    /// The path or query string of a request could not be parsed, e.g. because
    /// a query parameter was given twice.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A record from the seed feed did not have the expected shape.
    #[error("could not parse feed record: {0}")]
    InvalidFeedRecord(String),

    /// A sale date could not be converted to its stored text form.
    #[error("could not format sale date: {0}")]
    InvalidDate(String),

    /// The seed feed could not be fetched or decoded as a JSON array.
    ///
    /// This error is fatal at startup.
    #[error("could not fetch the seed feed: {0}")]
    FeedUnavailable(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<QueryRejection> for Error {
    fn from(value: QueryRejection) -> Self {
        tracing::debug!("rejected query string: {}", value.body_text());
        Error::MalformedRequest(value.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(value: PathRejection) -> Self {
        tracing::debug!("rejected path: {}", value.body_text());
        Error::MalformedRequest(value.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Not Found" })),
            )
                .into_response(),
            // The client only ever sees an opaque error, the details stay in the server logs.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                internal_server_error_response()
            }
        }
    }
}

/// The generic response sent to clients when a request could not be served.
pub(crate) fn internal_server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}
