use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BrowseAction {
    Show,
    Edit,
    Add,
}

/// Table selected per browse action, if the action is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseState {
    pub show: Option<String>,
    pub edit: Option<String>,
    pub add: Option<String>,
}

impl BrowseState {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, action: BrowseAction) -> &mut Option<String> {
        match action {
            BrowseAction::Show => &mut self.show,
            BrowseAction::Edit => &mut self.edit,
            BrowseAction::Add => &mut self.add,
        }
    }

    /// Pressing an open action closes it; pressing a closed one opens it on
    /// `current_table`.
    pub fn press(&self, action: BrowseAction, current_table: &str) -> Self {
        let mut next = self.clone();
        let slot = next.slot(action);
        *slot = if slot.is_some() {
            None
        } else {
            Some(current_table.to_string())
        };
        next
    }

    pub fn selected(&self, action: BrowseAction) -> Option<&str> {
        match action {
            BrowseAction::Show => self.show.as_deref(),
            BrowseAction::Edit => self.edit.as_deref(),
            BrowseAction::Add => self.add.as_deref(),
        }
    }
}
