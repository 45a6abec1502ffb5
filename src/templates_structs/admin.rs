use askama::Template;

use crate::models::vote::OptionVoters;
use super::PageContext;

/// One bar of the results chart.
pub struct ResultBar {
    pub name: String,
    pub votes: u64,
    /// Share of all votes, one decimal.
    pub percent: String,
    pub winner: bool,
}

pub struct VoteRow {
    pub username: String,
    pub option_name: String,
}

pub struct ResponseRow {
    pub username: String,
    pub text: String,
    pub time: String,
}

/// Expanded vote/response detail of one admin card.
pub struct DetailPanel {
    pub is_text: bool,
    pub error: Option<String>,
    pub heading: String,
    pub empty_message: &'static str,
    pub groups: Vec<OptionVoters>,
    pub history: Vec<VoteRow>,
    pub responses: Vec<ResponseRow>,
}

impl DetailPanel {
    pub fn is_empty(&self) -> bool {
        if self.is_text {
            self.responses.is_empty()
        } else {
            self.history.is_empty()
        }
    }
}

/// Management card of one poll.
pub struct AdminCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_text: bool,
    pub bars: Vec<ResultBar>,
    pub meta_kind: String,
    pub meta_total: String,
    pub short_id: String,
    pub edit_href: String,
    pub delete_href: String,
    pub clear_href: String,
    pub detail_href: String,
    pub detail_label: &'static str,
    pub export_href: String,
    pub detail: Option<DetailPanel>,
}

pub struct OptionRow {
    pub index: usize,
    pub value: String,
}

/// Create form or edit dialog contents.
pub struct DraftForm {
    pub heading: &'static str,
    pub action: String,
    pub cancel_href: String,
    pub submit_label: &'static str,
    pub title: String,
    pub description: String,
    pub is_text: bool,
    /// Create form: all options in one textarea.
    pub options_text: String,
    /// Edit dialog: one input per option row.
    pub option_rows: Vec<OptionRow>,
}

pub struct ConfirmDialog {
    pub heading: &'static str,
    pub message: String,
    pub action: String,
    pub confirm_label: &'static str,
    pub cancel_href: String,
}

#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub ctx: PageContext,
    pub export_all_href: String,
    pub export_summary_href: String,
    pub create_toggle_href: String,
    pub create_form: Option<DraftForm>,
    pub edit_dialog: Option<DraftForm>,
    pub confirm: Option<ConfirmDialog>,
    pub cards: Vec<AdminCard>,
}
