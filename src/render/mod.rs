//! Pure mapping from [`ViewState`](crate::views::ViewState) to template
//! structs. Nothing here touches the network or the session; handlers fetch,
//! then call into these functions once per request to rebuild the page.

pub mod admin;
pub mod student;

pub use admin::{DetailData, admin_page};
pub use student::student_page;

use crate::models::poll::Id;
use crate::views::{PanelState, ViewQuery, ViewState};

pub(crate) const SHOW_LABEL: &str = "View ▸";
pub(crate) const HIDE_LABEL: &str = "Hide ▾";

/// Href and label of the toggle for panel `id`.
pub(crate) fn toggle_link(
    base: &str,
    panel: &PanelState,
    id: &Id,
    mut query: ViewQuery,
    set: fn(&mut ViewQuery, Option<String>),
) -> (String, &'static str) {
    set(&mut query, panel.toggle(id).expanded_id().map(Id::to_string));
    let label = if panel.is_expanded(id) { HIDE_LABEL } else { SHOW_LABEL };
    (ViewState::href(base, &query), label)
}
