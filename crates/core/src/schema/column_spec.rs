//! Parsing of raw column-definition text (the body of a CREATE TABLE
//! statement) into column specs and table definitions.

use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

use super::introspector::RawTableSchemas;
use super::schema_model::{ColumnDefinition, ForeignKeyRef, SemanticType, TableDefinition};
use crate::errors::{DatabaseError, Result, SchemaParseError};

pub const FOREIGN_KEY_PREFIX: &str = "FOREIGN KEY";

static PRIMARY_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PRIMARY\s+KEY").expect("Invalid regex pattern"));

/// `FOREIGN KEY(<col>) <rest>`, whitespace-tolerant.
static FOREIGN_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^FOREIGN\s+KEY\s*\(\s*([^\s()]+)\s*\)\s*(.*)$").expect("Invalid regex pattern")
});

/// Table-level `PRIMARY KEY(<col>)` constraint.
static TABLE_PRIMARY_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^PRIMARY\s+KEY\s*\(\s*([^\s(),]+)\s*\)").expect("Invalid regex pattern")
});

static PAREN_OR_SPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[()\s]+").expect("Invalid regex pattern"));

static DATE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)date").expect("Invalid regex pattern"));

/// Value side of a column spec entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecValue {
    /// Semantic type of a plain column.
    Type(SemanticType),
    /// Opaque `REFERENCES <table>(<col>)` clause of a foreign key.
    Reference(String),
}

impl SpecValue {
    pub fn semantic_type(&self) -> Option<SemanticType> {
        match self {
            SpecValue::Type(t) => Some(*t),
            SpecValue::Reference(_) => None,
        }
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecValue::Type(t) => f.write_str(t.as_str()),
            SpecValue::Reference(clause) => f.write_str(clause),
        }
    }
}

impl Serialize for SpecValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Column name (or `FOREIGN KEY(<col>)`) -> type or reference clause, in
/// declaration order. Primary key columns are not listed.
pub type ColumnSpec = IndexMap<String, SpecValue>;

/// Referencing column -> referenced table and column.
pub type RestrictedColumns = IndexMap<String, ForeignKeyRef>;

/// One comma-separated fragment of a column-definition list.
enum Fragment<'a> {
    PrimaryKey,
    ForeignKey { column: &'a str, clause: &'a str },
    Column { name: &'a str, declared: &'a str },
}

fn is_foreign_key(fragment: &str) -> bool {
    fragment
        .get(..FOREIGN_KEY_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(FOREIGN_KEY_PREFIX))
}

/// Splits `FOREIGN KEY(<col>) REFERENCES ...` into the column and the clause.
fn split_foreign_key<'a>(
    table: &str,
    fragment: &'a str,
    raw: &str,
) -> std::result::Result<(&'a str, &'a str), SchemaParseError> {
    let malformed = || SchemaParseError::new(table, fragment, "malformed foreign key", raw);
    let caps = FOREIGN_KEY_REGEX.captures(fragment).ok_or_else(malformed)?;
    let (Some(column), Some(clause)) = (caps.get(1), caps.get(2)) else {
        return Err(malformed());
    };
    let clause = clause.as_str().trim();
    if clause.is_empty() {
        return Err(SchemaParseError::new(
            table,
            fragment,
            "foreign key without REFERENCES clause",
            raw,
        ));
    }
    Ok((column.as_str(), clause))
}

fn classify<'a>(
    table: &str,
    fragment: &'a str,
    raw: &str,
) -> std::result::Result<Fragment<'a>, SchemaParseError> {
    if PRIMARY_KEY_REGEX.is_match(fragment) {
        return Ok(Fragment::PrimaryKey);
    }
    if is_foreign_key(fragment) {
        let (column, clause) = split_foreign_key(table, fragment, raw)?;
        return Ok(Fragment::ForeignKey { column, clause });
    }
    let mut parts = fragment.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(name), Some(declared)) => Ok(Fragment::Column { name, declared }),
        _ => Err(SchemaParseError::new(
            table,
            fragment,
            "expected '<name> <type>'",
            raw,
        )),
    }
}

fn fragments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|f| !f.is_empty())
}

/// Semantic type of a plain column. Columns whose name contains `date` are
/// shown as dates whatever their storage type.
fn resolve_type(
    table: &str,
    name: &str,
    declared: &str,
    fragment: &str,
    raw: &str,
) -> std::result::Result<SemanticType, SchemaParseError> {
    if DATE_NAME_REGEX.is_match(name) {
        return Ok(SemanticType::Date);
    }
    SemanticType::from_declared(declared).ok_or_else(|| {
        SchemaParseError::new(table, fragment, format!("unsupported column type '{}'", declared), raw)
    })
}

/// Parses one table's raw column-definition text into a [`ColumnSpec`].
pub fn parse_column_definitions(
    table: &str,
    raw: &str,
) -> std::result::Result<ColumnSpec, SchemaParseError> {
    let mut spec = ColumnSpec::new();
    for fragment in fragments(raw) {
        match classify(table, fragment, raw)? {
            Fragment::PrimaryKey => continue,
            Fragment::ForeignKey { column, clause } => {
                spec.insert(
                    format!("{}({})", FOREIGN_KEY_PREFIX, column),
                    SpecValue::Reference(clause.to_string()),
                );
            }
            Fragment::Column { name, declared } => {
                let semantic = resolve_type(table, name, declared, fragment, raw)?;
                spec.insert(name.to_string(), SpecValue::Type(semantic));
            }
        }
    }
    Ok(spec)
}

/// Looks up `table_name` in the raw schemas and parses its definition.
pub fn parse_column_spec(raw_by_table: &RawTableSchemas, table_name: &str) -> Result<ColumnSpec> {
    let raw = raw_by_table.get(table_name).ok_or_else(|| {
        DatabaseError::NotFound(format!("table '{}' is not in the database", table_name))
    })?;
    Ok(parse_column_definitions(table_name, raw)?)
}

/// Extracts the foreign-key columns of a parsed spec and what they point at.
pub fn restricted_column_options(spec: &ColumnSpec) -> RestrictedColumns {
    let mut restricted = RestrictedColumns::new();
    for (key, value) in spec {
        if !key.starts_with(FOREIGN_KEY_PREFIX) {
            continue;
        }
        let SpecValue::Reference(clause) = value else {
            continue;
        };
        let key_parts: Vec<&str> = PAREN_OR_SPACE_REGEX
            .split(key)
            .filter(|p| !p.is_empty())
            .collect();
        let clause_parts: Vec<&str> = PAREN_OR_SPACE_REGEX
            .split(clause)
            .filter(|p| !p.is_empty())
            .collect();
        match (key_parts.get(2), clause_parts.get(1), clause_parts.get(2)) {
            (Some(column), Some(table), Some(target)) => {
                restricted.insert(column.to_string(), ForeignKeyRef::new(*table, *target));
            }
            _ => warn!("Ignoring malformed foreign key '{}': '{}'", key, clause),
        }
    }
    restricted
}

/// Rebuilds a structured [`TableDefinition`] from raw definition text,
/// including primary and foreign keys.
pub fn parse_table_definition(
    table: &str,
    raw: &str,
) -> std::result::Result<TableDefinition, SchemaParseError> {
    let mut columns: Vec<ColumnDefinition> = Vec::new();
    let mut table_primary_key: Option<String> = None;
    let mut foreign_keys: Vec<(String, String)> = Vec::new();

    for fragment in fragments(raw) {
        if let Some(caps) = TABLE_PRIMARY_KEY_REGEX.captures(fragment) {
            table_primary_key = caps.get(1).map(|m| m.as_str().to_string());
            continue;
        }
        if is_foreign_key(fragment) {
            let (column, clause) = split_foreign_key(table, fragment, raw)?;
            foreign_keys.push((column.to_string(), clause.to_string()));
            continue;
        }
        let mut parts = fragment.split_whitespace();
        let (Some(name), Some(declared)) = (parts.next(), parts.next()) else {
            return Err(SchemaParseError::new(
                table,
                fragment,
                "expected '<name> <type>'",
                raw,
            ));
        };
        columns.push(ColumnDefinition {
            name: name.to_string(),
            column_type: resolve_type(table, name, declared, fragment, raw)?,
            primary_key: PRIMARY_KEY_REGEX.is_match(fragment),
            references: None,
        });
    }

    if let Some(pk) = table_primary_key {
        let column = columns.iter_mut().find(|c| c.name == pk).ok_or_else(|| {
            SchemaParseError::new(table, &pk, "primary key names an unknown column", raw)
        })?;
        column.primary_key = true;
    }
    if columns.iter().filter(|c| c.primary_key).count() > 1 {
        return Err(SchemaParseError::new(table, raw, "more than one primary key", raw));
    }

    for (column_name, clause) in foreign_keys {
        let key = format!("{}({})", FOREIGN_KEY_PREFIX, column_name);
        let single: ColumnSpec = [(key, SpecValue::Reference(clause.clone()))].into_iter().collect();
        let reference = restricted_column_options(&single)
            .swap_remove(&column_name)
            .ok_or_else(|| SchemaParseError::new(table, &clause, "malformed REFERENCES clause", raw))?;
        let column = columns
            .iter_mut()
            .find(|c| c.name == column_name)
            .ok_or_else(|| {
                SchemaParseError::new(table, &column_name, "foreign key names an unknown column", raw)
            })?;
        column.references = Some(reference);
    }

    Ok(TableDefinition {
        name: table.to_string(),
        columns,
    })
}
