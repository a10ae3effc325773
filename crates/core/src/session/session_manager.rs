use chrono::NaiveDate;
use indexmap::IndexMap;
use log::{debug, info};
use std::path::Path;

use super::session_config::{SessionConfig, TableKind};
use crate::constants::{
    RECORDED_DATE_COLUMN, TYPES_CATEGORY_COLUMN, TYPES_OPTION_COLUMN, TYPES_VALUE_COLUMN,
    TYPE_OPTIONS_CATEGORY,
};
use crate::errors::Result;
use crate::portfolio::{
    aggregate_positions, transaction_columns, NewTransaction, Position, Transaction,
};
use crate::schema::{RawTableSchemas, SchemaDocument, SchemaIntrospector, TableDefinition};
use crate::storage::{GatewayOpener, StorageGatewayTrait};
use crate::values::{Filters, Record, SqlValue, TabularResult};

/// Allowed values per plain column, as listed in the `types` table.
pub type ColumnValueOptions = IndexMap<String, Vec<String>>;

/// Owns the live gateway and maps the ledger's logical tables onto it.
pub struct SessionManager {
    config: SessionConfig,
    opener: Box<dyn GatewayOpener>,
    gateway: Box<dyn StorageGatewayTrait>,
}

impl SessionManager {
    /// Opens a gateway on `config.db_path`. No tables are created until
    /// [`SessionManager::initiate_database`] runs.
    pub fn new(config: SessionConfig, opener: Box<dyn GatewayOpener>) -> Result<Self> {
        let gateway = opener.open(&config.db_path)?;
        Ok(SessionManager {
            config,
            opener,
            gateway,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn db_path(&self) -> &str {
        self.gateway.db_path()
    }

    pub fn gateway(&self) -> &dyn StorageGatewayTrait {
        self.gateway.as_ref()
    }

    pub fn table_name(&self, logical_type: &str) -> Result<&str> {
        self.config.table_name(logical_type)
    }

    /// Reads the schema document at `path`, or the configured default.
    pub fn load_schema_document(&self, path: Option<&Path>) -> Result<SchemaDocument> {
        let path = path.unwrap_or_else(|| Path::new(&self.config.schema_path));
        debug!("Loading schema document from {}", path.display());
        SchemaDocument::from_path(path)
    }

    /// Creates every table the document declares. Existing tables are left
    /// untouched.
    pub fn create_tables_from_schema(&self, document: &SchemaDocument) -> Result<usize> {
        let mut created = 0;
        for (name, table) in document.tables() {
            self.gateway.create_table(name, &table.columns)?;
            created += 1;
        }
        info!(
            "Ensured {} table(s) in database {}",
            created,
            self.gateway.db_path()
        );
        Ok(created)
    }

    /// Points the session at `db_path` (reopening only if it changed) and
    /// creates the tables of `schema`, or of the default schema document.
    pub fn initiate_database(
        &mut self,
        db_path: Option<&str>,
        schema: Option<&SchemaDocument>,
    ) -> Result<()> {
        if let Some(path) = db_path {
            if path != self.gateway.db_path() {
                info!(
                    "Switching database from {} to {}",
                    self.gateway.db_path(),
                    path
                );
                self.gateway = self.opener.open(path)?;
                self.config.db_path = path.to_string();
            }
        }
        let loaded;
        let document = match schema {
            Some(document) => document,
            None => {
                loaded = self.load_schema_document(None)?;
                &loaded
            }
        };
        self.create_tables_from_schema(document)?;
        Ok(())
    }

    /// Inserts `fields` into the table behind `logical_type`, optionally
    /// stamping the current time under `auto_timestamp_column`.
    pub fn add_entry(
        &self,
        logical_type: &str,
        fields: &Record,
        auto_timestamp_column: Option<&str>,
    ) -> Result<usize> {
        let table = self.config.table_name(logical_type)?;
        let mut record = fields.clone();
        if let Some(column) = auto_timestamp_column {
            record.insert(
                column.to_string(),
                SqlValue::Text(self.gateway.current_timestamp()),
            );
        }
        let columns: Vec<String> = record.keys().cloned().collect();
        let values: Vec<SqlValue> = record.into_values().collect();
        debug!("Adding entry to {} ({} column(s))", table, columns.len());
        self.gateway.insert_row(table, &values, Some(&columns))
    }

    /// Validates and appends one ledger entry, stamped with its recording time.
    pub fn add_transaction(&self, transaction: &NewTransaction) -> Result<usize> {
        transaction.validate()?;
        self.add_entry(
            TableKind::Transactions.as_str(),
            &transaction.to_record(),
            Some(RECORDED_DATE_COLUMN),
        )
    }

    /// Table name -> raw column-definition text, for every table or only the
    /// one behind `logical_type`.
    pub fn communicate_table_attributes(
        &self,
        logical_type: Option<&str>,
    ) -> Result<RawTableSchemas> {
        let filter = logical_type
            .map(|logical| self.config.table_name(logical))
            .transpose()?;
        SchemaIntrospector::new(self.gateway.as_ref()).get_table_schemas(filter)
    }

    pub fn table_definitions(&self, logical_type: Option<&str>) -> Result<Vec<TableDefinition>> {
        let filter = logical_type
            .map(|logical| self.config.table_name(logical))
            .transpose()?;
        SchemaIntrospector::new(self.gateway.as_ref()).table_definitions(filter)
    }

    pub fn list_tables_in_db(&self) -> Result<Vec<String>> {
        Ok(self
            .communicate_table_attributes(None)?
            .into_keys()
            .collect())
    }

    /// Recomputes the account's positions from its transactions and appends
    /// one row per security, all in one write.
    ///
    /// Every call appends; running it twice for the same date leaves two sets
    /// of rows.
    pub fn update_positions(
        &self,
        account_id: i64,
        as_of: NaiveDate,
        since: Option<NaiveDate>,
    ) -> Result<Vec<Position>> {
        let transactions_table = self.config.table_for(TableKind::Transactions)?;
        let positions_table = self.config.table_for(TableKind::Positions)?;

        let filters: Filters = [(
            transaction_columns::ACCOUNT_ID.to_string(),
            SqlValue::Integer(account_id),
        )]
        .into_iter()
        .collect();
        let ledger = self
            .gateway
            .query_rows(transactions_table, None, Some(&filters))?;
        let positions = aggregate_positions(&ledger, account_id, as_of, since)?;
        if positions.is_empty() {
            debug!("No transactions for account {}, positions unchanged", account_id);
            return Ok(positions);
        }

        let rows: Vec<Vec<SqlValue>> = positions.iter().map(Position::to_row).collect();
        self.gateway
            .insert_rows(positions_table, &Position::column_names(), &rows)?;
        info!(
            "Recorded {} position(s) for account {} as of {}",
            positions.len(),
            account_id,
            as_of
        );
        Ok(positions)
    }

    pub fn read(
        &self,
        table: &str,
        columns: Option<&[String]>,
        filters: Option<&Filters>,
    ) -> Result<TabularResult> {
        self.gateway.query_rows(table, columns, filters)
    }

    /// Ledger entries, optionally for one account, in storage order.
    pub fn list_transactions(&self, account_id: Option<i64>) -> Result<Vec<Transaction>> {
        let table = self.config.table_for(TableKind::Transactions)?;
        let filters: Option<Filters> = account_id.map(|id| {
            [(
                transaction_columns::ACCOUNT_ID.to_string(),
                SqlValue::Integer(id),
            )]
            .into_iter()
            .collect()
        });
        self.gateway
            .query_rows(table, None, filters.as_ref())?
            .records()
            .iter()
            .map(Transaction::from_record)
            .collect()
    }

    /// Allowed values for plain columns, read from the `types` table.
    /// Empty when the database has no such table.
    pub fn column_value_options(&self) -> Result<ColumnValueOptions> {
        let types_table = self.config.table_for(TableKind::Types)?;
        if !self.list_tables_in_db()?.iter().any(|t| t == types_table) {
            return Ok(ColumnValueOptions::new());
        }
        let columns = [
            TYPES_OPTION_COLUMN.to_string(),
            TYPES_VALUE_COLUMN.to_string(),
        ];
        let filters: Filters = [(
            TYPES_CATEGORY_COLUMN.to_string(),
            SqlValue::from(TYPE_OPTIONS_CATEGORY),
        )]
        .into_iter()
        .collect();
        let result = self
            .gateway
            .query_rows(types_table, Some(&columns), Some(&filters))?;

        let mut options = ColumnValueOptions::new();
        for row in &result.rows {
            let (Some(option), Some(value)) = (row.first(), row.get(1)) else {
                continue;
            };
            if option.is_null() || value.is_null() {
                continue;
            }
            options
                .entry(option.to_text())
                .or_default()
                .push(value.to_text());
        }
        Ok(options)
    }
}
