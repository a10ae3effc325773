//! Transaction ledger entries and the positions derived from them.

mod positions_calculator;
mod positions_model;
mod transactions_model;

pub use positions_calculator::aggregate_positions;
pub use positions_model::{position_columns, Position};
pub use transactions_model::{transaction_columns, NewTransaction, Transaction, TransactionType};
