use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use super::poll::Id;

/// One row of `GET /api/polls/{id}/votes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub username: String,
    #[serde(default)]
    pub option_id: Option<Id>,
    pub option_name: String,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteList {
    #[serde(default)]
    pub votes: Vec<VoteRecord>,
}

/// One row of `GET /api/polls/{id}/text-responses`.
#[derive(Debug, Clone, Deserialize)]
pub struct TextResponse {
    pub username: String,
    pub response_text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseList {
    #[serde(default)]
    pub responses: Vec<TextResponse>,
}

/// Voters of one option, for the admin detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionVoters {
    pub option_name: String,
    pub usernames: Vec<String>,
}

impl OptionVoters {
    pub fn count_label(&self) -> String {
        let n = self.usernames.len();
        format!("{n} vote{}", if n == 1 { "" } else { "s" })
    }
}

/// Group votes by option name, options in order of first appearance and
/// voters in vote order.
pub fn group_by_option(votes: &[VoteRecord]) -> Vec<OptionVoters> {
    let mut groups: Vec<OptionVoters> = Vec::new();
    for vote in votes {
        match groups.iter_mut().find(|g| g.option_name == vote.option_name) {
            Some(group) => group.usernames.push(vote.username.clone()),
            None => groups.push(OptionVoters {
                option_name: vote.option_name.clone(),
                usernames: vec![vote.username.clone()],
            }),
        }
    }
    groups
}

/// Render a backend timestamp as `YYYY-MM-DD HH:MM`. Unparseable input is
/// shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}
