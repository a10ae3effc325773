use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Toggleable menu entries. Sub-entries are only visible while their parent
/// is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuFlag {
    View,
    Summary,
    Chart,
    Browse,
    Edit,
    AddTrade,
    AddAccount,
    AddCashflow,
    Update,
    ManualUpdate,
    AutoUpdate,
    Settings,
    DbSettings,
    OtherSettings,
}

impl MenuFlag {
    pub fn parent(&self) -> Option<MenuFlag> {
        match self {
            MenuFlag::View | MenuFlag::Edit | MenuFlag::Update | MenuFlag::Settings => None,
            MenuFlag::Summary | MenuFlag::Chart | MenuFlag::Browse => Some(MenuFlag::View),
            MenuFlag::AddTrade | MenuFlag::AddAccount | MenuFlag::AddCashflow => {
                Some(MenuFlag::Edit)
            }
            MenuFlag::ManualUpdate | MenuFlag::AutoUpdate => Some(MenuFlag::Update),
            MenuFlag::DbSettings | MenuFlag::OtherSettings => Some(MenuFlag::Settings),
        }
    }
}

/// Which menu entries are switched on. Survives across interaction cycles;
/// every transition returns a new state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuState {
    active: BTreeSet<MenuFlag>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pressing an entry flips it.
    pub fn toggle(&self, flag: MenuFlag) -> Self {
        let mut next = self.clone();
        if !next.active.remove(&flag) {
            next.active.insert(flag);
        }
        next
    }

    pub fn is_active(&self, flag: MenuFlag) -> bool {
        self.active.contains(&flag)
    }

    /// Active and reachable: every ancestor is active too.
    pub fn is_visible(&self, flag: MenuFlag) -> bool {
        self.is_active(flag) && flag.parent().map_or(true, |p| self.is_visible(p))
    }

    pub fn active_flags(&self) -> impl Iterator<Item = MenuFlag> + '_ {
        self.active.iter().copied()
    }
}
