//! Forms module - builds entry forms from the live table schema and turns
//! submissions into typed records.

mod form_builder;
mod forms_model;


pub use form_builder::FormBuilder;
pub use forms_model::{
    choice_label, ChoiceList, ControlKind, FormConfig, FormControl, FormInput,
};
