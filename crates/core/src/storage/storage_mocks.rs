//! In-memory gateway used by the core's unit tests.

use indexmap::IndexMap;
use std::sync::{Arc, Mutex};

use super::storage_traits::{GatewayOpener, StorageGatewayTrait};
use crate::errors::{DatabaseError, Result};
use crate::schema::ColumnSchema;
use crate::values::{Filters, SqlValue, TabularResult};

#[derive(Debug, Default, Clone)]
pub(crate) struct MockTable {
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl MockTable {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    fn create_sql(&self, name: &str) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut part = format!("{} {}", c.name, c.column_type.clone().unwrap_or_default());
                if c.primary_key {
                    part.push_str(" PRIMARY KEY");
                }
                part
            })
            .collect();
        for c in &self.columns {
            if let Some(r) = &c.references {
                parts.push(format!("FOREIGN KEY({}) REFERENCES {}({})", c.name, r.table, r.column));
            }
        }
        format!("CREATE TABLE {} ({})", name, parts.join(", "))
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockDatabase {
    pub tables: IndexMap<String, MockTable>,
    pub create_calls: usize,
    pub insert_calls: usize,
}

#[derive(Debug, Default)]
pub(crate) struct MockStore {
    pub databases: IndexMap<String, MockDatabase>,
    pub opened: Vec<String>,
}

pub(crate) type SharedStore = Arc<Mutex<MockStore>>;

fn query_failed(message: impl Into<String>, statement: &str) -> DatabaseError {
    DatabaseError::QueryFailed {
        message: message.into(),
        statement: statement.to_string(),
        params: Vec::new(),
    }
}

pub(crate) struct MockGateway {
    path: String,
    store: SharedStore,
}

impl MockGateway {
    fn with_db<T>(&self, f: impl FnOnce(&mut MockDatabase) -> Result<T>) -> Result<T> {
        let mut store = self.store.lock().unwrap();
        let db = store.databases.entry(self.path.clone()).or_default();
        f(db)
    }

    fn build_row(
        table_name: &str,
        table: &MockTable,
        values: &[SqlValue],
        columns: Option<&[String]>,
    ) -> Result<Vec<SqlValue>> {
        let statement = format!("INSERT INTO {}", table_name);
        match columns {
            None => {
                if values.len() != table.columns.len() {
                    return Err(query_failed(
                        format!(
                            "table {} has {} columns but {} values were supplied",
                            table_name,
                            table.columns.len(),
                            values.len()
                        ),
                        &statement,
                    )
                    .into());
                }
                Ok(values.to_vec())
            }
            Some(columns) => {
                if columns.len() != values.len() {
                    return Err(DatabaseError::InvalidStatement("arity mismatch".into()).into());
                }
                let mut row = vec![SqlValue::Null; table.columns.len()];
                for (column, value) in columns.iter().zip(values) {
                    let idx = table.column_index(column).ok_or_else(|| {
                        query_failed(
                            format!("table {} has no column named {}", table_name, column),
                            &statement,
                        )
                    })?;
                    row[idx] = value.clone();
                }
                Ok(row)
            }
        }
    }
}

impl StorageGatewayTrait for MockGateway {
    fn db_path(&self) -> &str {
        &self.path
    }

    fn create_table(&self, name: &str, columns: &[ColumnSchema]) -> Result<()> {
        if columns.iter().any(|c| c.column_type.is_none()) {
            return Err(DatabaseError::InvalidStatement(format!("untyped column in {}", name)).into());
        }
        self.with_db(|db| {
            db.create_calls += 1;
            db.tables.entry(name.to_string()).or_insert_with(|| MockTable {
                columns: columns.to_vec(),
                rows: Vec::new(),
            });
            Ok(())
        })
    }

    fn insert_row(&self, table: &str, values: &[SqlValue], columns: Option<&[String]>) -> Result<usize> {
        self.with_db(|db| {
            db.insert_calls += 1;
            let target = db
                .tables
                .get_mut(table)
                .ok_or_else(|| query_failed(format!("no such table: {}", table), "INSERT"))?;
            let row = Self::build_row(table, target, values, columns)?;
            target.rows.push(row);
            Ok(1)
        })
    }

    fn insert_rows(&self, table: &str, columns: &[String], rows: &[Vec<SqlValue>]) -> Result<usize> {
        self.with_db(|db| {
            db.insert_calls += 1;
            let target = db
                .tables
                .get_mut(table)
                .ok_or_else(|| query_failed(format!("no such table: {}", table), "INSERT"))?;
            let built = {
                let shape: &MockTable = target;
                rows.iter()
                    .map(|values| Self::build_row(table, shape, values, Some(columns)))
                    .collect::<Result<Vec<_>>>()?
            };
            let count = built.len();
            target.rows.extend(built);
            Ok(count)
        })
    }

    fn query_rows(
        &self,
        table: &str,
        columns: Option<&[String]>,
        filters: Option<&Filters>,
    ) -> Result<TabularResult> {
        self.with_db(|db| {
            let source = db
                .tables
                .get(table)
                .ok_or_else(|| query_failed(format!("no such table: {}", table), "SELECT"))?;
            let selected: Vec<String> = match columns {
                Some(columns) => columns.to_vec(),
                None => source.columns.iter().map(|c| c.name.clone()).collect(),
            };
            let indexes = selected
                .iter()
                .map(|c| {
                    source
                        .column_index(c)
                        .ok_or_else(|| query_failed(format!("no such column: {}", c), "SELECT").into())
                })
                .collect::<Result<Vec<usize>>>()?;
            let mut rows = Vec::new();
            'rows: for row in &source.rows {
                if let Some(filters) = filters {
                    for (column, wanted) in filters {
                        let idx = source
                            .column_index(column)
                            .ok_or_else(|| query_failed(format!("no such column: {}", column), "SELECT"))?;
                        if row[idx].to_text() != wanted.to_text() {
                            continue 'rows;
                        }
                    }
                }
                rows.push(indexes.iter().map(|&i| row[i].clone()).collect());
            }
            Ok(TabularResult::new(selected, rows))
        })
    }

    fn get_catalog(&self) -> Result<TabularResult> {
        self.with_db(|db| {
            let rows = db
                .tables
                .iter()
                .enumerate()
                .map(|(i, (name, table))| {
                    vec![
                        SqlValue::from("table"),
                        SqlValue::from(name.as_str()),
                        SqlValue::from(name.as_str()),
                        SqlValue::Integer(i as i64 + 2),
                        SqlValue::Text(table.create_sql(name)),
                    ]
                })
                .collect();
            Ok(TabularResult::new(
                ["type", "name", "tbl_name", "rootpage", "sql"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                rows,
            ))
        })
    }
}

#[derive(Default, Clone)]
pub(crate) struct MockOpener {
    pub store: SharedStore,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table contents of the database at `path`.
    pub fn table(&self, path: &str, table: &str) -> Option<MockTable> {
        let store = self.store.lock().unwrap();
        store.databases.get(path).and_then(|db| db.tables.get(table).cloned())
    }

    pub fn opened(&self) -> Vec<String> {
        self.store.lock().unwrap().opened.clone()
    }

    pub fn create_calls(&self, path: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.databases.get(path).map(|db| db.create_calls).unwrap_or(0)
    }
}

impl GatewayOpener for MockOpener {
    fn open(&self, db_path: &str) -> Result<Box<dyn StorageGatewayTrait>> {
        self.store.lock().unwrap().opened.push(db_path.to_string());
        Ok(Box::new(MockGateway {
            path: db_path.to_string(),
            store: self.store.clone(),
        }))
    }
}
