use crate::models::poll::Id;

/// CSV downloads served directly by the backend. These are plain links the
/// browser navigates to; the portal never fetches them itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportLink {
    PollVotes(Id),
    AllVotes,
    Summary,
}

impl ExportLink {
    pub fn path(&self) -> String {
        match self {
            ExportLink::PollVotes(id) => format!("/api/polls/{}/votes/export", id.path_segment()),
            ExportLink::AllVotes => "/api/votes/export".to_string(),
            ExportLink::Summary => "/api/polls/export".to_string(),
        }
    }

    /// Absolute href against the browser-facing API origin.
    pub fn href(&self, public_base: &str) -> String {
        format!("{}{}", public_base.trim_end_matches('/'), self.path())
    }
}
