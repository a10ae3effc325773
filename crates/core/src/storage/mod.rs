//! Storage module - the gateway contract implemented by storage crates.

mod storage_traits;

#[cfg(test)]
pub(crate) mod storage_mocks;

pub use storage_traits::{GatewayOpener, StorageGatewayTrait, CATALOG_TABLE};
