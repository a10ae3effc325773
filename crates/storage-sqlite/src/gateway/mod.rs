//! The SQLite implementation of the core's storage gateway.

mod sql_builder;
mod sqlite_gateway;

pub use sql_builder::{create_table_sql, insert_sql, select_sql, CATALOG_QUERY};
pub use sqlite_gateway::{SqliteGateway, SqliteGatewayOpener};
