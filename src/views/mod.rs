pub mod state;

pub use state::{Overlay, PanelState, Role, ViewQuery, ViewState};
