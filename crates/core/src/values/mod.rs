//! Scalar values, records and tabular results exchanged with the storage layer.

mod values_model;

pub use values_model::{Filters, Record, SqlValue, TabularResult};
