/// Default database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "db/accounts";

/// Default declarative schema document
pub const DEFAULT_SCHEMA_PATH: &str = "config/default_db.yaml";

/// Environment variable overriding the database path
pub const DB_PATH_ENV: &str = "FOLIO_DB_PATH";

/// Environment variable overriding the schema document path
pub const SCHEMA_PATH_ENV: &str = "FOLIO_SCHEMA_PATH";

/// Column receiving the insertion timestamp of ledger entries
pub const RECORDED_DATE_COLUMN: &str = "recorded_date";

/// `types.category` value marking allowed values for a plain column
pub const TYPE_OPTIONS_CATEGORY: &str = "types_col_values";

/// Separator between row values in choice labels
pub const CHOICE_LABEL_SEPARATOR: &str = " - ";

/// Columns of the `types` lookup table
pub const TYPES_CATEGORY_COLUMN: &str = "category";
pub const TYPES_OPTION_COLUMN: &str = "option";
pub const TYPES_VALUE_COLUMN: &str = "value";
