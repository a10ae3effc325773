use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DB_PATH_ENV, DEFAULT_DB_PATH, DEFAULT_SCHEMA_PATH, SCHEMA_PATH_ENV};
use crate::errors::{ConfigurationError, Error, Result};

/// Stable logical keys for the ledger's tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Accounts,
    Securities,
    Transactions,
    Holdings,
    Positions,
    Prices,
    FxRates,
    Aggregates,
    Types,
}

impl TableKind {
    pub const ALL: [TableKind; 9] = [
        TableKind::Accounts,
        TableKind::Securities,
        TableKind::Transactions,
        TableKind::Holdings,
        TableKind::Positions,
        TableKind::Prices,
        TableKind::FxRates,
        TableKind::Aggregates,
        TableKind::Types,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Accounts => "accounts",
            TableKind::Securities => "securities",
            TableKind::Transactions => "transactions",
            TableKind::Holdings => "holdings",
            TableKind::Positions => "positions",
            TableKind::Prices => "prices",
            TableKind::FxRates => "fx_rates",
            TableKind::Aggregates => "aggregates",
            TableKind::Types => "types",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TableKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownTableType(s.to_string()).into())
    }
}

/// Logical table -> physical table name.
pub type TableMap = IndexMap<TableKind, String>;

/// Identity mapping: every logical table is stored under its own key.
pub fn default_table_map() -> TableMap {
    TableKind::ALL
        .into_iter()
        .map(|kind| (kind, kind.as_str().to_string()))
        .collect()
}

/// Where the session keeps its data and which schema it creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub db_path: String,
    pub schema_path: String,
    pub tables: TableMap,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            db_path: DEFAULT_DB_PATH.to_string(),
            schema_path: DEFAULT_SCHEMA_PATH.to_string(),
            tables: default_table_map(),
        }
    }
}

impl SessionConfig {
    /// Reads overrides from the environment (and a `.env` file, if any).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let db_path = std::env::var(DB_PATH_ENV).unwrap_or_else(|_| DEFAULT_DB_PATH.into());
        let schema_path =
            std::env::var(SCHEMA_PATH_ENV).unwrap_or_else(|_| DEFAULT_SCHEMA_PATH.into());
        debug!("Session config: db_path={}, schema_path={}", db_path, schema_path);
        SessionConfig {
            db_path,
            schema_path,
            tables: default_table_map(),
        }
    }

    pub fn with_db_path(mut self, db_path: impl Into<String>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_schema_path(mut self, schema_path: impl Into<String>) -> Self {
        self.schema_path = schema_path.into();
        self
    }

    /// Stores a logical table under a different physical name.
    pub fn with_table(mut self, kind: TableKind, physical: impl Into<String>) -> Self {
        self.tables.insert(kind, physical.into());
        self
    }

    /// Physical table for a logical type key such as `"transactions"`.
    pub fn table_name(&self, logical_type: &str) -> Result<&str> {
        let kind: TableKind = logical_type.parse()?;
        self.table_for(kind)
    }

    pub fn table_for(&self, kind: TableKind) -> Result<&str> {
        self.tables
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| ConfigurationError::UnknownTableType(kind.to_string()).into())
    }

    /// Logical type stored under the physical table `table`.
    pub fn logical_type_of(&self, table: &str) -> Result<TableKind> {
        self.tables
            .iter()
            .find(|(_, physical)| physical.as_str() == table)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| ConfigurationError::UnknownTableType(table.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.db_path, "db/accounts");
        assert_eq!(config.schema_path, "config/default_db.yaml");
        assert_eq!(config.tables.len(), 9);
        assert_eq!(config.table_name("fx_rates").unwrap(), "fx_rates");
    }

    #[test]
    fn test_unknown_logical_type_fails() {
        let err = SessionConfig::default().table_name("dividends").unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::UnknownTableType(ref name)) if name == "dividends"
        ));
    }

    #[test]
    fn test_renamed_table() {
        let config = SessionConfig::default().with_table(TableKind::Transactions, "ledger");
        assert_eq!(config.table_name("transactions").unwrap(), "ledger");
        assert_eq!(config.table_for(TableKind::Accounts).unwrap(), "accounts");
        assert_eq!(config.logical_type_of("ledger").unwrap(), TableKind::Transactions);
        assert!(config.logical_type_of("transactions").is_err());
    }

    #[test]
    fn test_removed_mapping_fails() {
        let mut config = SessionConfig::default();
        config.tables.shift_remove(&TableKind::Prices);
        assert!(config.table_name("prices").is_err());
    }

    #[test]
    fn test_table_kind_round_trip() {
        for kind in TableKind::ALL {
            assert_eq!(kind.as_str().parse::<TableKind>().unwrap(), kind);
        }
    }
}
