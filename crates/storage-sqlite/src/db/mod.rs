//! Connection setup for the ledger database file.

use log::{debug, info};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

use crate::errors::StorageError;

/// Path understood by SQLite as a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Opens (creating if needed) the database file at `db_path`, creating its
/// parent directory first.
pub fn open_connection(db_path: &str) -> Result<Connection, StorageError> {
    if db_path != IN_MEMORY_PATH {
        if let Some(db_dir) = Path::new(db_path).parent() {
            if !db_dir.as_os_str().is_empty() && !db_dir.exists() {
                debug!("Creating database directory {}", db_dir.display());
                fs::create_dir_all(db_dir)?;
            }
        }
    }

    let conn = Connection::open(db_path).map_err(|source| StorageError::ConnectionFailed {
        path: db_path.to_string(),
        source,
    })?;
    conn.execute_batch(CONNECTION_PRAGMAS)?;
    info!("Opened database {}", db_path);
    Ok(conn)
}
