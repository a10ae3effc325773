use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::to_db_date;
use crate::values::SqlValue;

/// Physical column names of the positions table, in insert order.
pub mod position_columns {
    pub const DATE: &str = "date";
    pub const ACCOUNT_ID: &str = "acc_id";
    pub const SECURITY_ID: &str = "sec_id";
    pub const QUANTITY: &str = "quantity";

    pub const ALL: [&str; 4] = [DATE, ACCOUNT_ID, SECURITY_ID, QUANTITY];
}

/// Net holding of one security in one account as of a date.
///
/// Derived from the transaction ledger; every recomputation appends new rows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub date: NaiveDate,
    pub account_id: i64,
    pub security_id: i64,
    pub quantity: Decimal,
}

impl Position {
    pub fn new(date: NaiveDate, account_id: i64, security_id: i64) -> Self {
        Position {
            date,
            account_id,
            security_id,
            quantity: Decimal::ZERO,
        }
    }

    pub fn column_names() -> Vec<String> {
        position_columns::ALL.iter().map(|c| c.to_string()).collect()
    }

    /// Row values matching [`Position::column_names`].
    pub fn to_row(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(to_db_date(self.date)),
            SqlValue::Integer(self.account_id),
            SqlValue::Integer(self.security_id),
            SqlValue::from_decimal(self.quantity),
        ]
    }
}
