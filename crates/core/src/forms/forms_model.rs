use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::constants::CHOICE_LABEL_SEPARATOR;
use crate::schema::{ColumnSpec, RestrictedColumns};
use crate::values::SqlValue;

/// Input widgets supplied by the host UI. Each call renders one labelled
/// control and returns what the user currently entered.
pub trait FormInput {
    fn text_input(&mut self, label: &str) -> String;

    fn number_input(&mut self, label: &str) -> Option<f64>;

    fn date_input(&mut self, label: &str) -> Option<NaiveDate>;

    /// Returns the selected label, if any.
    fn choice_input(&mut self, label: &str, options: &[String]) -> Option<String>;

    /// True once the user confirmed the form.
    fn submit_button(&mut self, label: &str) -> bool;
}

/// Parsed column spec of a table plus its foreign-key constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub table: String,
    pub spec: ColumnSpec,
    pub restricted: RestrictedColumns,
}

/// Label -> stored value for a constrained field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceList {
    pub source_table: String,
    pub options: IndexMap<String, SqlValue>,
    /// Set when the source table had no rows and `options` only holds the
    /// placeholder entry.
    pub empty: bool,
}

impl ChoiceList {
    pub fn from_rows(source_table: &str, options: IndexMap<String, SqlValue>) -> Self {
        if options.is_empty() {
            return Self::placeholder(source_table);
        }
        ChoiceList {
            source_table: source_table.to_string(),
            options,
            empty: false,
        }
    }

    /// Single non-selectable entry naming the empty table.
    pub fn placeholder(source_table: &str) -> Self {
        let mut options = IndexMap::new();
        options.insert(
            format!("No selectable values found in table '{}'", source_table),
            SqlValue::Null,
        );
        ChoiceList {
            source_table: source_table.to_string(),
            options,
            empty: true,
        }
    }

    /// Plain values offered as their own labels.
    pub fn from_values(source_table: &str, values: &[String]) -> Self {
        let options = values
            .iter()
            .map(|v| (v.clone(), SqlValue::Text(v.clone())))
            .collect();
        Self::from_rows(source_table, options)
    }

    pub fn labels(&self) -> Vec<String> {
        self.options.keys().cloned().collect()
    }

    pub fn value_for(&self, label: &str) -> Option<&SqlValue> {
        if self.empty {
            return None;
        }
        self.options.get(label)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

/// Joins a row's values into a choice label.
pub fn choice_label(row: &[SqlValue]) -> String {
    row.iter()
        .map(SqlValue::to_text)
        .collect::<Vec<_>>()
        .join(CHOICE_LABEL_SEPARATOR)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ControlKind {
    Text,
    Integer,
    Number,
    Date,
    Choice { choices: ChoiceList },
}

/// One rendered field of a form, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormControl {
    pub column: String,
    pub control: ControlKind,
}
