use serde::{Deserialize, Serialize};

use crate::models::poll::{Id, Poll, PollDraft, sort_polls};

/// Which composition a page renders. Fixed by the route the page is mounted
/// on, never derived from request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    /// Path of the page this role renders.
    pub fn base_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Student => "/",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Expand/collapse state of a list of panels. At most one panel is expanded,
/// so expanding one collapses all others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    expanded: Option<Id>,
}

impl PanelState {
    pub fn collapsed() -> Self {
        Self::default()
    }

    pub fn expanded(id: Id) -> Self {
        Self { expanded: Some(id) }
    }

    pub fn is_expanded(&self, id: &Id) -> bool {
        self.expanded.as_ref() == Some(id)
    }

    pub fn expanded_id(&self) -> Option<&Id> {
        self.expanded.as_ref()
    }

    /// State after clicking the toggle of panel `id`.
    pub fn toggle(&self, id: &Id) -> Self {
        if self.is_expanded(id) {
            Self::collapsed()
        } else {
            Self::expanded(id.clone())
        }
    }

    /// Swap the expanded id for the fetched poll's own id, or collapse when
    /// no poll has it (e.g. the poll was deleted).
    fn resolve_in(self, polls: &[Poll]) -> Self {
        match self.expanded.and_then(|id| resolve(polls, &id)) {
            Some(id) => Self::expanded(id),
            None => Self::collapsed(),
        }
    }

    fn param(&self) -> Option<String> {
        self.expanded.as_ref().map(Id::to_string)
    }
}

/// Modal or inline form currently shown on the admin page.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Create,
    Edit(Id),
    ConfirmDelete(Id),
    ConfirmClear(Id),
}

impl Overlay {
    /// Ids become the fetched poll's own, and an overlay for a missing poll
    /// is dropped.
    fn resolve_in(self, polls: &[Poll]) -> Self {
        let resolved = |id: &Id, make: fn(Id) -> Overlay| {
            resolve(polls, id).map_or(Overlay::None, make)
        };
        match self {
            Overlay::Edit(id) => resolved(&id, Overlay::Edit),
            Overlay::ConfirmDelete(id) => resolved(&id, Overlay::ConfirmDelete),
            Overlay::ConfirmClear(id) => resolved(&id, Overlay::ConfirmClear),
            other => other,
        }
    }
}

/// Id of the poll in `polls` that `id` refers to.
fn resolve(polls: &[Poll], id: &Id) -> Option<Id> {
    polls.iter().find(|p| p.id.matches(id)).map(|p| p.id.clone())
}

/// UI-only state, carried in the query string of GET pages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ViewQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<String>,
}

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ViewQuery {
    pub fn panel(&self) -> PanelState {
        non_blank(&self.open).map_or_else(PanelState::collapsed, |id| PanelState::expanded(Id::from_param(id)))
    }

    pub fn detail_panel(&self) -> PanelState {
        non_blank(&self.detail).map_or_else(PanelState::collapsed, |id| PanelState::expanded(Id::from_param(id)))
    }

    /// The open overlay. If several are requested, edit wins over the
    /// confirmations, which win over the create form.
    pub fn overlay(&self) -> Overlay {
        if let Some(id) = non_blank(&self.edit) {
            Overlay::Edit(Id::from_param(id))
        } else if let Some(id) = non_blank(&self.delete) {
            Overlay::ConfirmDelete(Id::from_param(id))
        } else if let Some(id) = non_blank(&self.clear) {
            Overlay::ConfirmClear(Id::from_param(id))
        } else if non_blank(&self.create).is_some() {
            Overlay::Create
        } else {
            Overlay::None
        }
    }
}

/// Everything one render pass reads.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Fetched polls in display order.
    pub polls: Vec<Poll>,
    pub username: Option<String>,
    pub panel: PanelState,
    pub detail: PanelState,
    pub overlay: Overlay,
    /// Form contents to show in the open create/edit overlay instead of the
    /// poll's stored values (a rejected or row-edited submission).
    pub draft: Option<PollDraft>,
}

impl ViewState {
    pub fn new(mut polls: Vec<Poll>, username: Option<String>, query: &ViewQuery) -> Self {
        sort_polls(&mut polls);
        let panel = query.panel().resolve_in(&polls);
        let detail = query.detail_panel().resolve_in(&polls);
        let overlay = query.overlay().resolve_in(&polls);
        Self {
            polls,
            username,
            panel,
            detail,
            overlay,
            draft: None,
        }
    }

    pub fn with_overlay(mut self, overlay: Overlay, draft: Option<PollDraft>) -> Self {
        self.overlay = overlay.resolve_in(&self.polls);
        self.draft = draft;
        self
    }

    pub fn poll(&self, id: &Id) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id.matches(id))
    }

    /// Query string reproducing the current panel state, with no overlay.
    pub fn panels_query(&self) -> ViewQuery {
        ViewQuery {
            open: self.panel.param(),
            detail: self.detail.param(),
            ..Default::default()
        }
    }

    /// Link to `base` with the given UI state.
    pub fn href(base: &str, query: &ViewQuery) -> String {
        match serde_urlencoded::to_string(query) {
            Ok(qs) if !qs.is_empty() => format!("{base}?{qs}"),
            _ => base.to_string(),
        }
    }
}
