//! Session module - configuration, logical table mapping and the manager
//! that owns the live storage gateway.

mod session_config;
mod session_manager;


pub use session_config::{default_table_map, SessionConfig, TableKind, TableMap};
pub use session_manager::{ColumnValueOptions, SessionManager};
