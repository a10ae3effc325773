//! Menu and browse selections kept by the host UI between interactions.

mod browse_state;
mod menu_state;

pub use browse_state::{BrowseAction, BrowseState};
pub use menu_state::{MenuFlag, MenuState};
