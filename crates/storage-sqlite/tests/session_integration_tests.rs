//! End-to-end tests of the session manager and form builder over SQLite,
//! using the shipped default schema.

use chrono::NaiveDate;
use folio_core::errors::{DatabaseError, Error};
use folio_core::forms::{FormBuilder, FormInput};
use folio_core::portfolio::{NewTransaction, Position, TransactionType};
use folio_core::values::{Filters, Record, SqlValue};
use folio_core::{SessionConfig, SessionManager, StorageGatewayTrait};
use folio_storage_sqlite::SqliteGatewayOpener;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::{tempdir, TempDir};

const DEFAULT_SCHEMA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default_db.yaml");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(fields: &[(&str, SqlValue)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn session() -> (SessionManager, TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("accounts.db");
    let config = SessionConfig::default()
        .with_db_path(db_path.to_str().unwrap())
        .with_schema_path(DEFAULT_SCHEMA);
    let mut session = SessionManager::new(config, Box::new(SqliteGatewayOpener)).unwrap();
    session.initiate_database(None, None).unwrap();

    session
        .add_entry(
            "accounts",
            &record(&[("id", 1.into()), ("short_name", "Broker".into())]),
            Some("change_date"),
        )
        .unwrap();
    for (id, name, kind) in [(11, "SP500", "etf"), (102, "N100", "etf"), (103, "MSCI", "fund")] {
        let security = record(&[
            ("sec_id", id.into()),
            ("short_name", name.into()),
            ("full_name", name.into()),
            ("type", kind.into()),
            ("subtype", "index".into()),
        ]);
        session.add_entry("securities", &security, None).unwrap();
    }
    (session, dir)
}

fn trade(sec: i64, day: NaiveDate, kind: TransactionType, quantity: Decimal) -> NewTransaction {
    NewTransaction {
        security_id: sec,
        account_id: 1,
        date: day,
        transaction_type: kind,
        quantity,
        unit_price: dec!(100),
        costs: dec!(1.5),
        currency: "USD".to_string(),
    }
}

fn seed_trades(session: &SessionManager) {
    let trades = [
        trade(11, date(2023, 1, 10), TransactionType::Buy, dec!(10)),
        trade(102, date(2023, 2, 10), TransactionType::Buy, dec!(15)),
        trade(103, date(2023, 3, 10), TransactionType::Buy, dec!(15)),
        trade(11, date(2023, 4, 10), TransactionType::Sell, dec!(-5)),
    ];
    for t in &trades {
        session.add_transaction(t).unwrap();
    }
}

#[test]
fn test_default_schema_creates_all_tables() {
    let (session, _dir) = session();
    let tables = session.list_tables_in_db().unwrap();
    assert_eq!(
        tables,
        vec![
            "accounts",
            "securities",
            "transactions",
            "holdings",
            "positions",
            "prices",
            "fx_rates",
            "aggregates",
            "types"
        ]
    );
}

#[test]
fn test_initiate_twice_keeps_rows() {
    let (mut session, _dir) = session();
    session.initiate_database(None, None).unwrap();
    assert_eq!(session.read("securities", None, None).unwrap().len(), 3);
}

#[test]
fn test_update_positions_aggregates_and_appends() {
    let (session, _dir) = session();
    seed_trades(&session);

    let as_of = date(2023, 5, 1);
    let positions = session.update_positions(1, as_of, None).unwrap();
    let summary: Vec<(i64, Decimal)> = positions
        .iter()
        .map(|p| (p.security_id, p.quantity))
        .collect();
    assert_eq!(summary, vec![(11, dec!(5)), (102, dec!(15)), (103, dec!(15))]);

    let stored = session.read("positions", None, None).unwrap();
    assert_eq!(stored.columns, Position::column_names());
    let expected: Vec<Vec<SqlValue>> = vec![
        vec!["2023-05-01".into(), 1.into(), 11.into(), 5.into()],
        vec!["2023-05-01".into(), 1.into(), 102.into(), 15.into()],
        vec!["2023-05-01".into(), 1.into(), 103.into(), 15.into()],
    ];
    assert_eq!(stored.rows, expected);
}

#[test]
fn test_update_positions_since_date() {
    let (session, _dir) = session();
    seed_trades(&session);
    let positions = session
        .update_positions(1, date(2023, 5, 1), Some(date(2023, 3, 1)))
        .unwrap();
    let summary: Vec<(i64, Decimal)> = positions
        .iter()
        .map(|p| (p.security_id, p.quantity))
        .collect();
    assert_eq!(summary, vec![(103, dec!(15)), (11, dec!(-5))]);
}

#[test]
fn test_transaction_round_trip() {
    let (session, _dir) = session();
    seed_trades(&session);

    let transactions = session.list_transactions(Some(1)).unwrap();
    assert_eq!(transactions.len(), 4);
    let sell = &transactions[3];
    assert_eq!(sell.id, Some(4));
    assert_eq!(sell.transaction_type, TransactionType::Sell);
    assert_eq!(sell.quantity, dec!(-5));
    assert_eq!(sell.total_price, dec!(500));
    assert_eq!(sell.costs, dec!(1.5));
    assert!(sell.recorded_date.is_some());
    assert!(session.list_transactions(Some(2)).unwrap().is_empty());
}

#[test]
fn test_recorded_timestamp_parses_back() {
    let (session, _dir) = session();
    seed_trades(&session);
    let columns = vec!["recorded_date".to_string()];
    let stored = session.read("transactions", Some(&columns), None).unwrap();
    for row in &stored.rows {
        let text = row[0].as_str().unwrap();
        assert!(session.gateway().parse_timestamp(text).is_ok(), "{}", text);
    }
}

#[test]
fn test_unknown_security_is_rejected() {
    let (session, _dir) = session();
    let err = session
        .add_transaction(&trade(999, date(2023, 1, 1), TransactionType::Buy, dec!(1)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::ConstraintViolation { .. })
    ));
    assert!(session.list_transactions(None).unwrap().is_empty());
}

#[test]
fn test_table_definitions_recover_foreign_keys() {
    let (session, _dir) = session();
    let definitions = session.table_definitions(Some("transactions")).unwrap();
    assert_eq!(definitions.len(), 1);
    let transactions = &definitions[0];
    assert_eq!(transactions.primary_key().map(|c| c.name.as_str()), Some("tr_id"));
    let keys: Vec<(&str, String)> = transactions
        .foreign_keys()
        .map(|(column, target)| (column, format!("{}.{}", target.table, target.column)))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("sec_id", "securities.sec_id".to_string()),
            ("acc_id", "accounts.id".to_string())
        ]
    );
}

#[test]
fn test_switching_database_path() {
    let (mut session, dir) = session();
    let other = dir.path().join("other").join("accounts.db");
    let other = other.to_str().unwrap();
    session.initiate_database(Some(other), None).unwrap();
    assert_eq!(session.db_path(), other);
    assert!(session.read("securities", None, None).unwrap().is_empty());
}

#[test]
fn test_filtered_read() {
    let (session, _dir) = session();
    let filters: Filters = [("short_name".to_string(), SqlValue::from("N100"))]
        .into_iter()
        .collect();
    let columns = vec!["sec_id".to_string()];
    let result = session
        .read("securities", Some(&columns), Some(&filters))
        .unwrap();
    assert_eq!(result.rows, vec![vec![SqlValue::Integer(102)]]);
}

#[derive(Default)]
struct TradeForm {
    security: Option<String>,
    submit: bool,
    offered: Vec<String>,
}

impl FormInput for TradeForm {
    fn text_input(&mut self, label: &str) -> String {
        match label {
            "type" => "buy".to_string(),
            "quantity" => "3".to_string(),
            "currency" => "EUR".to_string(),
            _ => String::new(),
        }
    }

    fn number_input(&mut self, label: &str) -> Option<f64> {
        (label == "unit_price").then_some(42.0)
    }

    fn date_input(&mut self, label: &str) -> Option<NaiveDate> {
        (label == "date").then(|| date(2024, 6, 3))
    }

    fn choice_input(&mut self, label: &str, options: &[String]) -> Option<String> {
        match label {
            "sec_id" => {
                self.offered = options.to_vec();
                self.security.clone()
            }
            "acc_id" => options.first().cloned(),
            _ => None,
        }
    }

    fn submit_button(&mut self, _label: &str) -> bool {
        self.submit
    }
}

#[test]
fn test_form_offers_one_choice_per_security() {
    let (session, _dir) = session();
    let mut ui = TradeForm::default();
    let record = FormBuilder::new(&session)
        .render_form("transactions", "Add", &mut ui)
        .unwrap();
    assert!(record.is_none());
    assert_eq!(
        ui.offered,
        vec![
            "11 - SP500 - SP500 - etf - index",
            "102 - N100 - N100 - etf - index",
            "103 - MSCI - MSCI - fund - index"
        ]
    );
}

#[test]
fn test_form_appends_transaction() {
    let (session, _dir) = session();
    let mut ui = TradeForm {
        security: Some("102 - N100 - N100 - etf - index".to_string()),
        submit: true,
        ..TradeForm::default()
    };
    let inserted = FormBuilder::new(&session)
        .append_entry("transactions", &mut ui)
        .unwrap();
    assert_eq!(inserted, Some(1));

    let stored = session.list_transactions(Some(1)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].security_id, 102);
    assert_eq!(stored[0].quantity, dec!(3));
    assert_eq!(stored[0].currency, "EUR");
    assert!(stored[0].recorded_date.is_some());
}
