//! Folio Core - schema-driven portfolio ledger.
//!
//! This crate holds the ledger's domain: schema documents and column-spec
//! parsing, the session manager, form building and the transaction and
//! position model. It is database-agnostic and defines the gateway trait
//! implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod forms;
pub mod portfolio;
pub mod schema;
pub mod session;
pub mod storage;
pub mod ui_state;
pub mod utils;
pub mod values;

pub use session::{SessionConfig, SessionManager, TableKind};
pub use storage::{GatewayOpener, StorageGatewayTrait};
pub use values::{Filters, Record, SqlValue, TabularResult};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
