//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap rusqlite errors and convert
//! them to the database-agnostic error types defined in `folio_core`.

use folio_core::errors::{DatabaseError, Error};
use rusqlite::ErrorCode;
use thiserror::Error;

/// Storage-specific errors that wrap rusqlite types.
///
/// These errors are internal to the storage layer and are converted to
/// `folio_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed for {path}: {source}")]
    ConnectionFailed {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database directory could not be created: {0}")]
    Io(#[from] std::io::Error),

    #[error("{source} (statement: `{statement}`, params: {params:?})")]
    StatementFailed {
        statement: String,
        params: Vec<String>,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),
}

impl StorageError {
    /// Wraps an engine error together with the statement that raised it.
    pub fn statement(statement: &str, params: Vec<String>, source: rusqlite::Error) -> Self {
        StorageError::StatementFailed {
            statement: statement.to_string(),
            params,
            source,
        }
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation))
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed { path, source } => Error::Database(
                DatabaseError::ConnectionFailed(format!("{}: {}", path, source)),
            ),
            StorageError::Io(e) => Error::Database(DatabaseError::ConnectionFailed(e.to_string())),
            StorageError::StatementFailed {
                statement,
                params,
                source,
            } if is_constraint_violation(&source) => {
                Error::Database(DatabaseError::ConstraintViolation {
                    message: source.to_string(),
                    statement,
                    params,
                })
            }
            StorageError::StatementFailed {
                statement,
                params,
                source,
            } => Error::Database(DatabaseError::QueryFailed {
                message: source.to_string(),
                statement,
                params,
            }),
            StorageError::QueryFailed(e) => Error::Database(DatabaseError::QueryFailed {
                message: e.to_string(),
                statement: String::new(),
                params: Vec::new(),
            }),
        }
    }
}

/// Extension trait for converting rusqlite Results to core Results.
///
/// Since we can't implement `From<rusqlite::Error> for Error` due to orphan
/// rules, this provides `.into_core()` which routes through StorageError.
pub trait IntoCore<T> {
    fn into_core(self) -> folio_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, rusqlite::Error> {
    fn into_core(self) -> folio_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, StorageError> {
    fn into_core(self) -> folio_core::Result<T> {
        self.map_err(Into::into)
    }
}
