//! Schema module - declarative schema documents, catalog introspection and
//! column-spec parsing.

mod column_spec;
mod introspector;
mod schema_model;


pub use column_spec::{
    parse_column_definitions, parse_column_spec, parse_table_definition,
    restricted_column_options, ColumnSpec, RestrictedColumns, SpecValue, FOREIGN_KEY_PREFIX,
};
pub use introspector::{
    extract_column_definitions, table_schemas_from_catalog, RawTableSchemas, SchemaIntrospector,
};
pub use schema_model::{
    ColumnDefinition, ColumnSchema, DatabaseSchema, ForeignKeyRef, SchemaDocument, SemanticType,
    TableDefinition, TableSchema,
};
