use chrono::NaiveDate;
use log::{debug, warn};

use super::forms_model::{choice_label, ChoiceList, ControlKind, FormConfig, FormControl, FormInput};
use crate::constants::RECORDED_DATE_COLUMN;
use crate::errors::{DatabaseError, Result, ValidationError};
use crate::schema::{
    parse_column_spec, restricted_column_options, RestrictedColumns, SemanticType, SpecValue,
};
use crate::session::SessionManager;
use crate::utils::time_utils::to_db_date;
use crate::values::{Record, SqlValue};

/// Raw value captured from one control before coercion.
enum Captured {
    Text(String),
    Number(Option<f64>),
    Date(Option<NaiveDate>),
    Choice(Option<String>),
}

/// Builds entry forms from the live schema of a session's database.
pub struct FormBuilder<'a> {
    session: &'a SessionManager,
}

impl<'a> FormBuilder<'a> {
    pub fn new(session: &'a SessionManager) -> Self {
        FormBuilder { session }
    }

    /// Parsed column spec and foreign-key constraints of a physical table.
    pub fn build_form_config(&self, table_name: &str) -> Result<FormConfig> {
        let raw = self.session.communicate_table_attributes(None)?;
        let spec = parse_column_spec(&raw, table_name)?;
        let restricted = restricted_column_options(&spec);
        Ok(FormConfig {
            table: table_name.to_string(),
            spec,
            restricted,
        })
    }

    /// Choices for a foreign-key column: one option per row of the
    /// referenced table, labelled by the row's values and carrying the
    /// referenced column's value.
    pub fn build_choice_list(
        &self,
        restricted: &RestrictedColumns,
        column_name: &str,
    ) -> Result<ChoiceList> {
        let target = restricted.get(column_name).ok_or_else(|| {
            DatabaseError::NotFound(format!("column '{}' has no foreign key", column_name))
        })?;
        let rows = self.session.read(&target.table, None, None)?;
        let value_idx = rows.column_index(&target.column).ok_or_else(|| {
            DatabaseError::NotFound(format!(
                "column '{}' not found in table '{}'",
                target.column, target.table
            ))
        })?;

        let options = rows
            .rows
            .iter()
            .map(|row| {
                (
                    choice_label(row),
                    row.get(value_idx).cloned().unwrap_or_default(),
                )
            })
            .collect();
        let choices = ChoiceList::from_rows(&target.table, options);
        if choices.is_empty() {
            warn!("No selectable values in table '{}'", target.table);
        }
        Ok(choices)
    }

    /// One control per plain column, in declaration order.
    pub fn form_controls(&self, table_name: &str) -> Result<Vec<FormControl>> {
        let config = self.build_form_config(table_name)?;
        let value_options = self.session.column_value_options()?;

        let mut controls = Vec::with_capacity(config.spec.len());
        for (column, value) in &config.spec {
            let SpecValue::Type(semantic) = value else {
                continue;
            };
            let control = if config.restricted.contains_key(column) {
                ControlKind::Choice {
                    choices: self.build_choice_list(&config.restricted, column)?,
                }
            } else if let Some(values) = value_options.get(column) {
                ControlKind::Choice {
                    choices: ChoiceList::from_values(column, values),
                }
            } else {
                match semantic {
                    SemanticType::Text => ControlKind::Text,
                    SemanticType::Integer => ControlKind::Integer,
                    SemanticType::Real => ControlKind::Number,
                    SemanticType::Date => ControlKind::Date,
                }
            };
            controls.push(FormControl {
                column: column.clone(),
                control,
            });
        }
        Ok(controls)
    }

    /// Renders the table's form through `ui`. Returns the typed record only
    /// when the submit button was pressed.
    pub fn render_form(
        &self,
        table_name: &str,
        submit_label: &str,
        ui: &mut dyn FormInput,
    ) -> Result<Option<Record>> {
        let controls = self.form_controls(table_name)?;
        let captured: Vec<Captured> = controls
            .iter()
            .map(|c| match &c.control {
                ControlKind::Text | ControlKind::Integer => Captured::Text(ui.text_input(&c.column)),
                ControlKind::Number => Captured::Number(ui.number_input(&c.column)),
                ControlKind::Date => Captured::Date(ui.date_input(&c.column)),
                ControlKind::Choice { choices } => {
                    Captured::Choice(ui.choice_input(&c.column, &choices.labels()))
                }
            })
            .collect();

        if !ui.submit_button(submit_label) {
            return Ok(None);
        }

        let mut record = Record::with_capacity(controls.len());
        for (control, value) in controls.iter().zip(captured) {
            record.insert(control.column.clone(), coerce(control, value)?);
        }
        debug!("Form for '{}' submitted with {} field(s)", table_name, record.len());
        Ok(Some(record))
    }

    /// Renders the table's form and, once submitted, inserts the record.
    /// An unset `recorded_date` field is stamped with the current time.
    pub fn append_entry(&self, table_name: &str, ui: &mut dyn FormInput) -> Result<Option<usize>> {
        let kind = self.session.config().logical_type_of(table_name)?;
        let Some(mut record) = self.render_form(table_name, "Add", ui)? else {
            return Ok(None);
        };
        let stamp = match record.get(RECORDED_DATE_COLUMN) {
            Some(SqlValue::Null) => {
                record.shift_remove(RECORDED_DATE_COLUMN);
                Some(RECORDED_DATE_COLUMN)
            }
            _ => None,
        };
        self.session
            .add_entry(kind.as_str(), &record, stamp)
            .map(Some)
    }
}

fn coerce(control: &FormControl, value: Captured) -> Result<SqlValue> {
    let column = control.column.as_str();
    Ok(match (&control.control, value) {
        (ControlKind::Integer, Captured::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                SqlValue::Null
            } else {
                SqlValue::Integer(text.parse::<i64>().map_err(ValidationError::from)?)
            }
        }
        (_, Captured::Text(text)) => {
            if text.trim().is_empty() {
                SqlValue::Null
            } else {
                SqlValue::Text(text)
            }
        }
        (_, Captured::Number(number)) => number.map(SqlValue::Real).unwrap_or_default(),
        (_, Captured::Date(date)) => date
            .map(|d| SqlValue::Text(to_db_date(d)))
            .unwrap_or_default(),
        (ControlKind::Choice { choices }, Captured::Choice(Some(label))) => {
            choices.value_for(&label).cloned().ok_or_else(|| {
                ValidationError::InvalidInput(format!(
                    "'{}' is not a selectable value for '{}'",
                    label, column
                ))
            })?
        }
        (_, Captured::Choice(_)) => SqlValue::Null,
    })
}
