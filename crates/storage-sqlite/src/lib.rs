//! SQLite storage implementation for Folio.
//!
//! This crate provides all database-related functionality using rusqlite.
//! It implements the gateway trait defined in `folio-core` and contains:
//! - Connection setup for the ledger database file
//! - Statement building for table creation, inserts and filtered reads
//! - The gateway and the opener the session manager uses to replace it
//!
//! # Architecture
//!
//! This crate is the only place in the application where SQLite dependencies
//! exist. The core is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod gateway;

// Re-export database utilities
pub use db::{open_connection, IN_MEMORY_PATH};

// Re-export the gateway
pub use gateway::{SqliteGateway, SqliteGatewayOpener};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from folio-core for convenience
pub use folio_core::errors::{DatabaseError, Error, Result};
