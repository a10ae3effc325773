//! Reads the live catalog and recovers per-table column definitions.

use indexmap::IndexMap;
use log::{debug, warn};

use super::column_spec::parse_table_definition;
use super::schema_model::TableDefinition;
use crate::errors::Result;
use crate::storage::StorageGatewayTrait;
use crate::values::{SqlValue, TabularResult};

/// Raw column-definition text keyed by table name.
pub type RawTableSchemas = IndexMap<String, String>;

/// Returns the text between the first `(` and the last `)` of a CREATE
/// statement.
///
/// Parentheses inside default expressions or CHECK clauses shift the slice;
/// callers get whatever lies between the outermost pair.
pub fn extract_column_definitions(create_sql: &str) -> Option<&str> {
    let start = create_sql.find('(')?;
    let end = create_sql.rfind(')')?;
    (end > start).then(|| create_sql[start + 1..end].trim())
}

/// Builds table name -> raw definition text from catalog rows.
///
/// Only `table` rows with a stored statement are kept; SQLite's internal
/// tables are skipped.
pub fn table_schemas_from_catalog(
    catalog: &TabularResult,
    filter_table: Option<&str>,
) -> RawTableSchemas {
    let mut schemas = RawTableSchemas::new();
    let (Some(type_idx), Some(name_idx), Some(sql_idx)) = (
        catalog.column_index("type"),
        catalog.column_index("name"),
        catalog.column_index("sql"),
    ) else {
        warn!("Catalog result is missing type/name/sql columns: {:?}", catalog.columns);
        return schemas;
    };

    for row in &catalog.rows {
        if row.get(type_idx).and_then(SqlValue::as_str) != Some("table") {
            continue;
        }
        let Some(name) = row.get(name_idx).and_then(SqlValue::as_str) else {
            continue;
        };
        if name.starts_with("sqlite_") {
            continue;
        }
        if filter_table.is_some_and(|wanted| wanted != name) {
            continue;
        }
        match row
            .get(sql_idx)
            .and_then(SqlValue::as_str)
            .and_then(extract_column_definitions)
        {
            Some(definitions) => {
                schemas.insert(name.to_string(), definitions.to_string());
            }
            None => warn!("Skipping table '{}': no column definitions in catalog", name),
        }
    }
    schemas
}

/// Catalog reader bound to one gateway. Every call reads the catalog afresh.
pub struct SchemaIntrospector<'a> {
    gateway: &'a dyn StorageGatewayTrait,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(gateway: &'a dyn StorageGatewayTrait) -> Self {
        SchemaIntrospector { gateway }
    }

    pub fn get_table_schemas(&self, filter_table: Option<&str>) -> Result<RawTableSchemas> {
        let catalog = self.gateway.get_catalog()?;
        let schemas = table_schemas_from_catalog(&catalog, filter_table);
        debug!("Introspected {} table(s) from catalog", schemas.len());
        Ok(schemas)
    }

    /// Structured definitions, with primary and foreign keys, for every table
    /// (or only `filter_table`).
    pub fn table_definitions(&self, filter_table: Option<&str>) -> Result<Vec<TableDefinition>> {
        self.get_table_schemas(filter_table)?
            .iter()
            .map(|(name, raw)| parse_table_definition(name, raw).map_err(Into::into))
            .collect()
    }
}
