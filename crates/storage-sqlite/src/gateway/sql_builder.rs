//! Statement text for the gateway. Pure string building; nothing here
//! touches a connection.

use folio_core::errors::{DatabaseError, Result};
use folio_core::schema::ColumnSchema;

/// Reads the whole master catalog.
pub const CATALOG_QUERY: &str = "SELECT * FROM sqlite_master";

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// `CREATE TABLE IF NOT EXISTS name (col TYPE [PRIMARY KEY], ...)` followed
/// by one `FOREIGN KEY(col) REFERENCES table(col)` per referencing column.
pub fn create_table_sql(name: &str, columns: &[ColumnSchema]) -> Result<String> {
    if columns.is_empty() {
        return Err(DatabaseError::InvalidStatement(format!("table '{}' has no columns", name)).into());
    }
    let mut definitions = Vec::with_capacity(columns.len());
    for column in columns {
        let column_type = column
            .column_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                DatabaseError::InvalidStatement(format!(
                    "column '{}' of table '{}' has no declared type",
                    column.name, name
                ))
            })?;
        let mut definition = format!("{} {}", column.name, column_type);
        if column.primary_key {
            definition.push_str(" PRIMARY KEY");
        }
        definitions.push(definition);
    }
    for column in columns {
        if let Some(reference) = &column.references {
            definitions.push(format!(
                "FOREIGN KEY({}) REFERENCES {}({})",
                column.name, reference.table, reference.column
            ));
        }
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        name,
        definitions.join(", ")
    ))
}

/// Positional insert when `columns` is absent, named-column insert otherwise.
pub fn insert_sql(table: &str, value_count: usize, columns: Option<&[String]>) -> Result<String> {
    if value_count == 0 {
        return Err(DatabaseError::InvalidStatement(format!("no values to insert into '{}'", table)).into());
    }
    match columns {
        None => Ok(format!(
            "INSERT INTO {} VALUES ({})",
            table,
            placeholders(value_count)
        )),
        Some(columns) if columns.len() != value_count => Err(DatabaseError::InvalidStatement(format!(
            "{} column(s) named for {} value(s) in insert into '{}'",
            columns.len(),
            value_count,
            table
        ))
        .into()),
        Some(columns) => Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders(value_count)
        )),
    }
}

/// `SELECT <columns|*> FROM table [WHERE col IN (?) AND ...]`.
pub fn select_sql<'a>(
    table: &str,
    columns: Option<&[String]>,
    filter_columns: impl IntoIterator<Item = &'a str>,
) -> String {
    let projection = match columns {
        Some(columns) if !columns.is_empty() => columns.join(", "),
        _ => "*".to_string(),
    };
    let conditions: Vec<String> = filter_columns
        .into_iter()
        .map(|column| format!("{} IN (?)", column))
        .collect();
    if conditions.is_empty() {
        format!("SELECT {} FROM {}", projection, table)
    } else {
        format!(
            "SELECT {} FROM {} WHERE {}",
            projection,
            table,
            conditions.join(" AND ")
        )
    }
}
