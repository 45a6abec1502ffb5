use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend identifier. The API hands out integers today, but the client treats
/// ids as opaque and echoes them back in the same JSON shape it received.
///
/// An id read back from a URL or form field has lost that shape, so it is
/// kept as the exact text that was written. Such an id must be resolved
/// against fetched data with [`Id::matches`] before it goes into a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Text(String),
}

impl Id {
    /// Id as written in a URL path, query string or form field.
    pub fn from_param(raw: &str) -> Self {
        Id::Text(raw.trim().to_string())
    }

    /// Same id by textual form: `3` and `"3"` match, `7` and `"007"` do not.
    pub fn matches(&self, other: &Id) -> bool {
        match (self, other) {
            (Id::Num(a), Id::Num(b)) => a == b,
            (Id::Text(a), Id::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }

    /// The id as one percent-encoded URL path segment.
    pub fn path_segment(&self) -> String {
        let raw = self.to_string();
        let mut out = String::with_capacity(raw.len());
        for b in raw.bytes() {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
                out.push(b as char);
            } else {
                out.push_str(&format!("%{b:02X}"));
            }
        }
        out
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{n}"),
            Id::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollType {
    TextResponse,
    #[default]
    #[serde(other)]
    MultipleChoice,
}

impl PollType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollType::MultipleChoice => "multiple_choice",
            PollType::TextResponse => "text_response",
        }
    }

    /// Anything other than `text_response` is a multiple-choice poll.
    pub fn from_form(raw: &str) -> Self {
        if raw.trim() == "text_response" {
            PollType::TextResponse
        } else {
            PollType::MultipleChoice
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub votes: u64,
}

/// A poll as returned by `GET /api/polls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub poll_type: PollType,
    #[serde(default, rename = "opensLabel")]
    pub opens_label: Option<String>,
    #[serde(default, rename = "closesLabel")]
    pub closes_label: Option<String>,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

impl Poll {
    pub fn is_text(&self) -> bool {
        self.poll_type == PollType::TextResponse
    }

    /// Description, with the backend's empty string treated as absent.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| o.votes).sum()
    }

    /// Last six characters of the id, for compact display.
    pub fn short_id(&self) -> String {
        let id = self.id.to_string();
        let skip = id.chars().count().saturating_sub(6);
        id.chars().skip(skip).collect()
    }
}

/// Envelope of `GET /api/polls`.
#[derive(Debug, Deserialize)]
pub struct PollList {
    #[serde(default)]
    pub polls: Vec<Poll>,
}

/// Body of `POST /api/polls` and `PUT /api/polls/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollPayload {
    pub title: String,
    pub description: String,
    pub poll_type: PollType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}
