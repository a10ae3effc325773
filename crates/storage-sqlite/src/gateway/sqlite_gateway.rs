use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use folio_core::errors::{DatabaseError, Result};
use folio_core::schema::ColumnSchema;
use folio_core::storage::{GatewayOpener, StorageGatewayTrait};
use folio_core::values::{Filters, SqlValue, TabularResult};

use super::sql_builder::{create_table_sql, insert_sql, select_sql, CATALOG_QUERY};
use crate::db::{open_connection, IN_MEMORY_PATH};
use crate::errors::{IntoCore, StorageError};

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn from_sqlite(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(v),
        Value::Real(v) => SqlValue::Real(v),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(bytes) => SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

fn param_texts(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .map(|v| match v {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Text(s) => s.clone(),
            Value::Blob(b) => format!("<{} bytes>", b.len()),
        })
        .collect()
}

/// Gateway over a single owned SQLite connection.
pub struct SqliteGateway {
    db_path: String,
    conn: Connection,
}

impl SqliteGateway {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = open_connection(db_path).into_core()?;
        Ok(SqliteGateway {
            db_path: db_path.to_string(),
            conn,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(IN_MEMORY_PATH)
    }

    fn execute(&self, sql: &str, params: Vec<Value>) -> Result<usize> {
        debug!("Executing: {} {:?}", sql, params);
        self.conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(|e| StorageError::statement(sql, param_texts(&params), e))
            .into_core()
    }

    fn query(&self, sql: &str, params: Vec<Value>) -> Result<TabularResult> {
        debug!("Querying: {} {:?}", sql, params);
        let fail = |e| StorageError::statement(sql, param_texts(&params), e);

        let mut stmt = self.conn.prepare(sql).map_err(fail).into_core()?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i).map(from_sqlite))
                    .collect::<rusqlite::Result<Vec<SqlValue>>>()
            })
            .and_then(|mapped| mapped.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(fail)
            .into_core()?;
        Ok(TabularResult::new(columns, rows))
    }
}

impl StorageGatewayTrait for SqliteGateway {
    fn db_path(&self) -> &str {
        &self.db_path
    }

    fn create_table(&self, name: &str, columns: &[ColumnSchema]) -> Result<()> {
        let sql = create_table_sql(name, columns)?;
        self.execute(&sql, Vec::new())?;
        info!("Ensured table {} ({} column(s))", name, columns.len());
        Ok(())
    }

    fn insert_row(
        &self,
        table: &str,
        values: &[SqlValue],
        columns: Option<&[String]>,
    ) -> Result<usize> {
        let sql = insert_sql(table, values.len(), columns)?;
        self.execute(&sql, values.iter().map(to_sqlite).collect())
    }

    fn insert_rows(&self, table: &str, columns: &[String], rows: &[Vec<SqlValue>]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let sql = insert_sql(table, columns.len(), Some(columns))?;
        if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(DatabaseError::InvalidStatement(format!(
                "row with {} value(s) for {} column(s) in insert into '{}'",
                bad.len(),
                columns.len(),
                table
            ))
            .into());
        }

        let tx = self.conn.unchecked_transaction().into_core()?;
        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(&sql)
                .map_err(|e| StorageError::statement(&sql, Vec::new(), e))
                .into_core()?;
            for row in rows {
                let params: Vec<Value> = row.iter().map(to_sqlite).collect();
                debug!("Executing: {} {:?}", sql, params);
                inserted += stmt
                    .execute(params_from_iter(params.iter()))
                    .map_err(|e| StorageError::statement(&sql, param_texts(&params), e))
                    .into_core()?;
            }
        }
        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        debug!("Committed {} row(s) into {}", inserted, table);
        Ok(inserted)
    }

    fn query_rows(
        &self,
        table: &str,
        columns: Option<&[String]>,
        filters: Option<&Filters>,
    ) -> Result<TabularResult> {
        let filters = filters.filter(|f| !f.is_empty());
        let sql = select_sql(
            table,
            columns,
            filters
                .into_iter()
                .flat_map(|f| f.keys().map(String::as_str)),
        );
        let params: Vec<Value> = filters
            .into_iter()
            .flat_map(|f| f.values())
            .map(|v| Value::Text(v.to_text()))
            .collect();
        self.query(&sql, params)
    }

    fn get_catalog(&self) -> Result<TabularResult> {
        self.query(CATALOG_QUERY, Vec::new())
    }
}

/// Opens [`SqliteGateway`]s for the session manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteGatewayOpener;

impl GatewayOpener for SqliteGatewayOpener {
    fn open(&self, db_path: &str) -> Result<Box<dyn StorageGatewayTrait>> {
        Ok(Box::new(SqliteGateway::open(db_path)?))
    }
}
