//! Storage gateway traits.
//!
//! These traits define the contract for table creation, row insertion and
//! reads without any database-specific types, allowing for different
//! storage implementations.

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::schema::ColumnSchema;
use crate::utils::time_utils;
use crate::values::{Filters, SqlValue, TabularResult};

/// Name of the engine's master catalog table.
pub const CATALOG_TABLE: &str = "sqlite_master";

/// Thin typed wrapper over one open database.
///
/// A gateway owns exactly one connection and is not shared between callers.
pub trait StorageGatewayTrait: Send {
    /// Path of the database file this gateway is connected to.
    fn db_path(&self) -> &str;

    /// Creates the table if it does not exist yet.
    ///
    /// Every column must carry a declared type.
    fn create_table(&self, name: &str, columns: &[ColumnSchema]) -> Result<()>;

    /// Inserts one row and commits.
    ///
    /// Without `columns` the values are bound positionally and must follow the
    /// table's physical column order.
    fn insert_row(
        &self,
        table: &str,
        values: &[SqlValue],
        columns: Option<&[String]>,
    ) -> Result<usize>;

    /// Inserts several rows with the same named columns in one scoped write.
    /// Either every row is committed or none is.
    fn insert_rows(&self, table: &str, columns: &[String], rows: &[Vec<SqlValue>]) -> Result<usize>;

    /// `SELECT <columns|*> FROM <table> [WHERE col IN (?) AND ...]`.
    fn query_rows(
        &self,
        table: &str,
        columns: Option<&[String]>,
        filters: Option<&Filters>,
    ) -> Result<TabularResult>;

    /// Every row of the master catalog.
    fn get_catalog(&self) -> Result<TabularResult>;

    fn current_timestamp(&self) -> String {
        time_utils::current_timestamp()
    }

    fn parse_timestamp(&self, text: &str) -> Result<DateTime<Utc>> {
        time_utils::parse_timestamp(text)
    }
}

/// Opens gateways for a database path. The session manager uses it to
/// replace its gateway when the target database changes.
pub trait GatewayOpener {
    fn open(&self, db_path: &str) -> Result<Box<dyn StorageGatewayTrait>>;
}
