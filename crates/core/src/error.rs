//! Error types for the search form core.
//!
//! None of these are fatal: validation errors become UI state, storage errors
//! are logged and the form keeps working with defaults.

use thiserror::Error;

/// The preference store could not be reached, read, or written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Unavailable(format!("malformed preferences: {e}"))
    }
}

/// A search submission was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query text is empty")]
    Empty,

    #[error("query text is too long ({len} > {max} characters)")]
    TooLong { len: usize, max: usize },

    #[error("search form is unmounted")]
    Unmounted,
}

/// A location that does not address a search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location has no query text")]
    MissingQuery,

    #[error("invalid page number '{0}'")]
    InvalidPage(String),

    #[error("invalid query text: {0}")]
    InvalidQuery(#[from] QueryError),
}
