//! Integration tests for the SQLite gateway against database files.

use folio_core::errors::{DatabaseError, Error};
use folio_core::schema::{ColumnSchema, SchemaIntrospector};
use folio_core::storage::StorageGatewayTrait;
use folio_core::values::{Filters, SqlValue};
use folio_storage_sqlite::SqliteGateway;
use tempfile::tempdir;

fn transactions_columns() -> Vec<ColumnSchema> {
    vec![
        ColumnSchema::new("tr_id", "INTEGER").primary(),
        ColumnSchema::new("sec_id", "INTEGER"),
        ColumnSchema::new("date", "TEXT"),
        ColumnSchema::new("quantity", "INTEGER"),
        ColumnSchema::new("unit_price", "REAL"),
    ]
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_create_table_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    let gateway = SqliteGateway::open(path.to_str().unwrap()).unwrap();

    gateway.create_table("transactions", &transactions_columns()).unwrap();
    gateway
        .insert_row(
            "transactions",
            &[SqlValue::Integer(11), "2024-01-02".into()],
            Some(&names(&["sec_id", "date"])),
        )
        .unwrap();
    gateway.create_table("transactions", &transactions_columns()).unwrap();

    let schemas = SchemaIntrospector::new(&gateway).get_table_schemas(None).unwrap();
    assert_eq!(schemas.len(), 1);
    assert_eq!(
        schemas["transactions"],
        "tr_id INTEGER PRIMARY KEY, sec_id INTEGER, date TEXT, quantity INTEGER, unit_price REAL"
    );
    assert_eq!(gateway.query_rows("transactions", None, None).unwrap().len(), 1);
}

#[test]
fn test_named_insert_reads_back_in_table_order() {
    let dir = tempdir().unwrap();
    let gateway = SqliteGateway::open(dir.path().join("ledger.db").to_str().unwrap()).unwrap();
    gateway.create_table("transactions", &transactions_columns()).unwrap();

    gateway
        .insert_row(
            "transactions",
            &[SqlValue::Real(99.5), SqlValue::Integer(10), "2024-01-02".into(), SqlValue::Integer(11)],
            Some(&names(&["unit_price", "quantity", "date", "sec_id"])),
        )
        .unwrap();

    let result = gateway.query_rows("transactions", None, None).unwrap();
    assert_eq!(
        result.columns,
        names(&["tr_id", "sec_id", "date", "quantity", "unit_price"])
    );
    assert_eq!(
        result.rows,
        vec![vec![
            SqlValue::Integer(1),
            SqlValue::Integer(11),
            SqlValue::Text("2024-01-02".into()),
            SqlValue::Integer(10),
            SqlValue::Real(99.5),
        ]]
    );
}

#[test]
fn test_filters_combine_with_and() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    gateway
        .create_table(
            "holdings",
            &[
                ColumnSchema::new("instrument", "TEXT"),
                ColumnSchema::new("quantity", "INTEGER"),
                ColumnSchema::new("currency", "TEXT"),
            ],
        )
        .unwrap();
    let columns = names(&["instrument", "quantity", "currency"]);
    let rows: Vec<Vec<SqlValue>> = vec![
        vec!["SP500".into(), 5.into(), "EUR".into()],
        vec!["N100".into(), 15.into(), "USD".into()],
        vec!["SP500".into(), 7.into(), "USD".into()],
    ];
    assert_eq!(gateway.insert_rows("holdings", &columns, &rows).unwrap(), 3);

    let filters: Filters = [
        ("currency".to_string(), SqlValue::from("USD")),
        ("instrument".to_string(), SqlValue::from("SP500")),
    ]
    .into_iter()
    .collect();
    let result = gateway
        .query_rows("holdings", Some(&names(&["quantity"])), Some(&filters))
        .unwrap();
    assert_eq!(result.rows, vec![vec![SqlValue::Integer(7)]]);
}

#[test]
fn test_unknown_table_surfaces_statement() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    match gateway.query_rows("missing", None, None) {
        Err(Error::Database(DatabaseError::QueryFailed { statement, .. })) => {
            assert_eq!(statement, "SELECT * FROM missing");
        }
        other => panic!("expected a query failure, got {:?}", other),
    }
}

#[test]
fn test_foreign_keys_are_enforced() {
    let gateway = SqliteGateway::open_in_memory().unwrap();
    gateway
        .create_table("accounts", &[ColumnSchema::new("id", "INTEGER").primary()])
        .unwrap();
    gateway
        .create_table(
            "positions",
            &[
                ColumnSchema::new("acc_id", "INTEGER").references("accounts", "id"),
                ColumnSchema::new("quantity", "INTEGER"),
            ],
        )
        .unwrap();
    let err = gateway
        .insert_row("positions", &[SqlValue::Integer(9), SqlValue::Integer(1)], None)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::ConstraintViolation { .. })
    ));
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("ledger.db");
    let path = path.to_str().unwrap();
    {
        let gateway = SqliteGateway::open(path).unwrap();
        gateway.create_table("transactions", &transactions_columns()).unwrap();
        gateway
            .insert_row("transactions", &[SqlValue::Integer(102)], Some(&names(&["sec_id"])))
            .unwrap();
    }
    let reopened = SqliteGateway::open(path).unwrap();
    let result = reopened
        .query_rows("transactions", Some(&names(&["sec_id"])), None)
        .unwrap();
    assert_eq!(result.rows, vec![vec![SqlValue::Integer(102)]]);
}
