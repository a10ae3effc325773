//! Declarative schema documents and the structured table definitions
//! recovered from a live database.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::errors::{ConfigurationError, Error, Result};

/// Semantic column type. Resolved once while parsing, never re-matched as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SemanticType {
    Integer,
    Text,
    Real,
    Date,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Integer => "INTEGER",
            SemanticType::Text => "TEXT",
            SemanticType::Real => "REAL",
            SemanticType::Date => "DATE",
        }
    }

    /// Maps a declared SQL type onto a semantic type using SQLite's affinity
    /// rules. `BLOB` and typeless declarations have no semantic type.
    pub fn from_declared(declared: &str) -> Option<Self> {
        let upper = declared.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return None;
        }
        if upper == "DATE" || upper == "DATETIME" || upper == "TIMESTAMP" {
            return Some(SemanticType::Date);
        }
        if upper.contains("INT") {
            Some(SemanticType::Integer)
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Some(SemanticType::Text)
        } else if upper.contains("REAL")
            || upper.contains("FLOA")
            || upper.contains("DOUB")
            || upper.contains("NUMERIC")
            || upper.contains("DECIMAL")
        {
            Some(SemanticType::Real)
        } else {
            None
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a foreign key: `REFERENCES <table>(<column>)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

impl ForeignKeyRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        ForeignKeyRef {
            table: table.into(),
            column: column.into(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One column as declared in a schema document.
///
/// `column_type` is kept as declared text; a missing type is only rejected
/// when the table is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKeyRef>,
}

impl ColumnSchema {
    pub fn new(name: &str, column_type: &str) -> Self {
        ColumnSchema {
            name: name.to_string(),
            column_type: Some(column_type.to_string()),
            primary_key: false,
            references: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.references = Some(ForeignKeyRef::new(table, column));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub tables: IndexMap<String, TableSchema>,
}

/// The declarative schema file: `database.tables.<name>.columns[]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub database: DatabaseSchema,
}

impl SchemaDocument {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let document: SchemaDocument = serde_yaml::from_str(text)?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigIO(format!("cannot read schema file {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &TableSchema)> {
        self.database.tables.iter()
    }

    /// Checks the per-table invariants: at most one primary key, unique
    /// column names, and foreign keys pointing at declared columns.
    pub fn validate(&self) -> Result<()> {
        for (table, schema) in self.tables() {
            let mut seen = HashSet::new();
            for column in &schema.columns {
                if !seen.insert(column.name.as_str()) {
                    return Err(invalid(format!(
                        "table '{}' declares column '{}' twice",
                        table, column.name
                    )));
                }
            }
            let primary_keys = schema.columns.iter().filter(|c| c.primary_key).count();
            if primary_keys > 1 {
                return Err(invalid(format!(
                    "table '{}' declares {} primary keys",
                    table, primary_keys
                )));
            }
            for column in &schema.columns {
                let Some(reference) = &column.references else {
                    continue;
                };
                // Targets outside the document may already exist in the database.
                if let Some(target) = self.database.tables.get(&reference.table) {
                    if !target.columns.iter().any(|c| c.name == reference.column) {
                        return Err(invalid(format!(
                            "{}.{} references missing column {}.{}",
                            table, column.name, reference.table, reference.column
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::Configuration(ConfigurationError::InvalidSchema(message))
}

/// A column recovered from the live database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: SemanticType,
    pub primary_key: bool,
    pub references: Option<ForeignKeyRef>,
}

/// A table recovered from the live database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&str, &ForeignKeyRef)> {
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref().map(|r| (c.name.as_str(), r)))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
