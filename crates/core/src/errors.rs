//! Core error types for the Folio ledger.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from SQLite) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Schema parsing failed: {0}")]
    SchemaParse(#[from] SchemaParseError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Position calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// Failures raised by the storage engine keep the statement and the bound
/// parameters so callers can report exactly what was attempted.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open the database file.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// The engine rejected a statement.
    #[error("{message} (statement: `{statement}`, params: {params:?})")]
    QueryFailed {
        message: String,
        statement: String,
        params: Vec<String>,
    },

    /// A unique, foreign key, not-null or check constraint was violated.
    #[error("Constraint violation: {message} (statement: `{statement}`, params: {params:?})")]
    ConstraintViolation {
        message: String,
        statement: String,
        params: Vec<String>,
    },

    /// The statement could not be built from the given arguments.
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// The requested table or record was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A scoped write could not be committed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

/// Raised when a column-definition fragment has an unexpected shape.
///
/// The raw definition text travels with the error so the caller can show it
/// instead of a form.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("table '{table}': cannot parse column fragment '{fragment}': {reason}")]
pub struct SchemaParseError {
    pub table: String,
    pub fragment: String,
    pub reason: String,
    pub raw_definition: String,
}

impl SchemaParseError {
    pub fn new(table: &str, fragment: &str, reason: impl Into<String>, raw: &str) -> Self {
        SchemaParseError {
            table: table.to_string(),
            fragment: fragment.to_string(),
            reason: reason.into(),
            raw_definition: raw.to_string(),
        }
    }
}

/// Programmer or configuration mistakes. These are not recovered from.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Unknown table type '{0}'")]
    UnknownTableType(String),

    #[error("Invalid schema document: {0}")]
    InvalidSchema(String),
}

/// Errors raised while aggregating the transaction ledger.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Transaction row is missing column '{0}'")]
    MissingColumn(String),

    #[error("Invalid value in column '{column}': {value}")]
    InvalidValue { column: String, value: String },
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Failed to parse integer: {0}")]
    IntegerParse(#[from] ParseIntError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Configuration(ConfigurationError::InvalidSchema(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
