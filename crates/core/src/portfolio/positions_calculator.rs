use chrono::NaiveDate;
use indexmap::IndexMap;
use log::debug;
use rust_decimal::Decimal;

use super::positions_model::Position;
use super::transactions_model::transaction_columns as tx;
use crate::errors::{CalculatorError, Error, Result};
use crate::utils::time_utils::parse_date;
use crate::values::{SqlValue, TabularResult};

fn column(transactions: &TabularResult, name: &str) -> Result<usize> {
    transactions
        .column_index(name)
        .ok_or_else(|| CalculatorError::MissingColumn(name.to_string()).into())
}

fn invalid(column: &str, value: Option<&SqlValue>) -> Error {
    CalculatorError::InvalidValue {
        column: column.to_string(),
        value: value.map(SqlValue::to_text).unwrap_or_default(),
    }
    .into()
}

/// Sums the signed quantity of an account's transactions per security.
///
/// `transactions` must already be restricted to the account. When `since` is
/// given, transactions dated before it are ignored. Securities come out in
/// the order they first appear in the ledger.
pub fn aggregate_positions(
    transactions: &TabularResult,
    account_id: i64,
    as_of: NaiveDate,
    since: Option<NaiveDate>,
) -> Result<Vec<Position>> {
    if transactions.is_empty() {
        return Ok(Vec::new());
    }
    let sec_idx = column(transactions, tx::SECURITY_ID)?;
    let qty_idx = column(transactions, tx::QUANTITY)?;
    let date_idx = match since {
        Some(_) => Some(column(transactions, tx::DATE)?),
        None => None,
    };

    let mut by_security: IndexMap<i64, Position> = IndexMap::new();
    let mut skipped = 0usize;
    for row in &transactions.rows {
        if let (Some(since), Some(idx)) = (since, date_idx) {
            let value = row.get(idx);
            let date = value
                .and_then(SqlValue::as_str)
                .and_then(|text| parse_date(text).ok())
                .ok_or_else(|| invalid(tx::DATE, value))?;
            if date < since {
                skipped += 1;
                continue;
            }
        }

        let sec_value = row.get(sec_idx);
        let security_id = sec_value
            .and_then(SqlValue::as_i64)
            .ok_or_else(|| invalid(tx::SECURITY_ID, sec_value))?;
        let qty_value = row.get(qty_idx);
        let quantity: Decimal = qty_value
            .and_then(SqlValue::as_decimal)
            .ok_or_else(|| invalid(tx::QUANTITY, qty_value))?;

        by_security
            .entry(security_id)
            .or_insert_with(|| Position::new(as_of, account_id, security_id))
            .quantity += quantity;
    }

    debug!(
        "Aggregated {} transaction(s) of account {} into {} position(s), {} before cutoff",
        transactions.len(),
        account_id,
        by_security.len(),
        skipped
    );
    Ok(by_security.into_values().collect())
}
