use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{CalculatorError, Error, Result, ValidationError};
use crate::utils::time_utils::{parse_date, parse_timestamp, to_db_date};
use crate::values::{Record, SqlValue};

/// Physical column names of the transaction ledger.
pub mod transaction_columns {
    pub const ID: &str = "tr_id";
    pub const SECURITY_ID: &str = "sec_id";
    pub const ACCOUNT_ID: &str = "acc_id";
    pub const DATE: &str = "date";
    pub const TYPE: &str = "type";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT_PRICE: &str = "unit_price";
    pub const TOTAL_PRICE: &str = "total_price";
    pub const COSTS: &str = "costs";
    pub const CURRENCY: &str = "currency";
    pub const RECORDED_DATE: &str = "recorded_date";
}

use transaction_columns as col;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown transaction type '{}'",
                other
            ))
            .into()),
        }
    }
}

/// A ledger entry as read back from storage. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Option<i64>,
    pub security_id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    /// Signed: positive for buys, negative for sells.
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub costs: Decimal,
    pub currency: String,
    pub recorded_date: Option<DateTime<Utc>>,
}

fn required<'a>(record: &'a Record, column: &str) -> Result<&'a SqlValue> {
    record
        .get(column)
        .filter(|v| !v.is_null())
        .ok_or_else(|| CalculatorError::MissingColumn(column.to_string()).into())
}

fn invalid(column: &str, value: &SqlValue) -> Error {
    CalculatorError::InvalidValue {
        column: column.to_string(),
        value: value.to_text(),
    }
    .into()
}

fn int_field(record: &Record, column: &str) -> Result<i64> {
    let value = required(record, column)?;
    value.as_i64().ok_or_else(|| invalid(column, value))
}

fn decimal_field(record: &Record, column: &str) -> Result<Decimal> {
    match record.get(column) {
        None | Some(SqlValue::Null) => Ok(Decimal::ZERO),
        Some(value) => value.as_decimal().ok_or_else(|| invalid(column, value)),
    }
}

impl Transaction {
    pub fn from_record(record: &Record) -> Result<Self> {
        let date_value = required(record, col::DATE)?;
        let type_value = required(record, col::TYPE)?;
        Ok(Transaction {
            id: record.get(col::ID).and_then(SqlValue::as_i64),
            security_id: int_field(record, col::SECURITY_ID)?,
            account_id: int_field(record, col::ACCOUNT_ID)?,
            date: parse_date(&date_value.to_text()).map_err(|_| invalid(col::DATE, date_value))?,
            transaction_type: type_value.to_text().parse()?,
            quantity: decimal_field(record, col::QUANTITY)?,
            unit_price: decimal_field(record, col::UNIT_PRICE)?,
            total_price: decimal_field(record, col::TOTAL_PRICE)?,
            costs: decimal_field(record, col::COSTS)?,
            currency: record.get(col::CURRENCY).map(SqlValue::to_text).unwrap_or_default(),
            recorded_date: record
                .get(col::RECORDED_DATE)
                .and_then(SqlValue::as_str)
                .and_then(|text| parse_timestamp(text).ok()),
        })
    }
}

/// Input for a new ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub security_id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub costs: Decimal,
    pub currency: String,
}

impl NewTransaction {
    /// Buys carry a positive quantity, sells a negative one.
    pub fn validate(&self) -> Result<()> {
        if self.quantity.is_zero() {
            return Err(ValidationError::InvalidInput("quantity must not be zero".into()).into());
        }
        match (self.transaction_type, self.quantity.is_sign_negative()) {
            (TransactionType::Buy, true) => Err(ValidationError::InvalidInput(
                "buy transactions need a positive quantity".into(),
            )
            .into()),
            (TransactionType::Sell, false) => Err(ValidationError::InvalidInput(
                "sell transactions need a negative quantity".into(),
            )
            .into()),
            _ => {
                if self.unit_price.is_sign_negative() || self.costs.is_sign_negative() {
                    return Err(ValidationError::InvalidInput(
                        "prices and costs cannot be negative".into(),
                    )
                    .into());
                }
                if self.currency.trim().is_empty() {
                    return Err(ValidationError::MissingField(col::CURRENCY.into()).into());
                }
                Ok(())
            }
        }
    }

    /// Unsigned amount paid or received, excluding costs.
    pub fn total_price(&self) -> Decimal {
        self.quantity.abs() * self.unit_price
    }

    /// Named-column record, without id or recorded timestamp.
    pub fn to_record(&self) -> Record {
        [
            (col::SECURITY_ID, SqlValue::Integer(self.security_id)),
            (col::ACCOUNT_ID, SqlValue::Integer(self.account_id)),
            (col::DATE, SqlValue::Text(to_db_date(self.date))),
            (col::TYPE, SqlValue::Text(self.transaction_type.to_string())),
            (col::QUANTITY, SqlValue::from_decimal(self.quantity)),
            (col::UNIT_PRICE, SqlValue::from_decimal(self.unit_price)),
            (col::TOTAL_PRICE, SqlValue::from_decimal(self.total_price())),
            (col::COSTS, SqlValue::from_decimal(self.costs)),
            (col::CURRENCY, SqlValue::Text(self.currency.clone())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}
