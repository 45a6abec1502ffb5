use crate::gateway::ExportLink;
use crate::models::poll::{Id, Poll, PollDraft, PollType};
use crate::models::vote::{TextResponse, VoteRecord, format_timestamp, group_by_option};
use crate::templates_structs::{
    AdminCard, AdminTemplate, ConfirmDialog, DetailPanel, DraftForm, OptionRow, PageContext,
    ResponseRow, ResultBar, VoteRow,
};
use crate::views::{Overlay, Role, ViewQuery, ViewState};

use super::toggle_link;

const BASE: &str = "/admin";

/// Detail records fetched for the expanded admin panel.
#[derive(Debug)]
pub enum DetailData {
    Votes(Vec<VoteRecord>),
    Responses(Vec<TextResponse>),
    /// The fetch failed; the panel shows the message instead.
    Failed(String),
}

/// Build the admin page. `detail` belongs to the poll whose detail panel is
/// expanded, if any. `public_base` is the browser-facing API origin used for
/// the CSV links.
pub fn admin_page(
    ctx: PageContext,
    state: &ViewState,
    detail: Option<DetailData>,
    public_base: &str,
) -> AdminTemplate {
    let panels = state.panels_query();
    let mut detail = detail;

    let cards = state
        .polls
        .iter()
        .map(|poll| {
            let data = if state.detail.is_expanded(&poll.id) {
                detail.take()
            } else {
                None
            };
            card(poll, state, &panels, data, public_base)
        })
        .collect();

    let create_toggle_href = if state.overlay == Overlay::Create {
        ViewState::href(BASE, &panels)
    } else {
        ViewState::href(
            BASE,
            &ViewQuery {
                create: Some("1".into()),
                ..panels.clone()
            },
        )
    };

    let cancel_href = ViewState::href(BASE, &panels);
    let mut create_form = None;
    let mut edit_dialog = None;
    let mut confirm = None;

    match &state.overlay {
        Overlay::None => {}
        Overlay::Create => {
            let draft = state.draft.clone().unwrap_or_default();
            create_form = Some(create_form_for(&draft, cancel_href));
        }
        Overlay::Edit(id) => {
            if let Some(poll) = state.poll(id) {
                let draft = state
                    .draft
                    .clone()
                    .unwrap_or_else(|| PollDraft::from_poll(poll));
                edit_dialog = Some(edit_dialog_for(id, &draft, cancel_href));
            }
        }
        Overlay::ConfirmDelete(id) => {
            if let Some(poll) = state.poll(id) {
                confirm = Some(ConfirmDialog {
                    heading: "Delete Poll",
                    message: format!("Delete this poll? \"{}\" and all of its votes will be removed.", poll.title),
                    action: format!("/admin/polls/{}/delete", id.path_segment()),
                    confirm_label: "Delete",
                    cancel_href,
                });
            }
        }
        Overlay::ConfirmClear(id) => {
            if let Some(poll) = state.poll(id) {
                confirm = Some(ConfirmDialog {
                    heading: "Clear Votes",
                    message: format!("Clear all votes for \"{}\"? This cannot be undone.", poll.title),
                    action: format!("/admin/polls/{}/clear", id.path_segment()),
                    confirm_label: "Clear Votes",
                    cancel_href,
                });
            }
        }
    }

    AdminTemplate {
        ctx,
        export_all_href: ExportLink::AllVotes.href(public_base),
        export_summary_href: ExportLink::Summary.href(public_base),
        create_toggle_href,
        create_form,
        edit_dialog,
        confirm,
        cards,
    }
}

fn card(
    poll: &Poll,
    state: &ViewState,
    panels: &ViewQuery,
    data: Option<DetailData>,
    public_base: &str,
) -> AdminCard {
    let total = poll.total_votes();
    let is_text = poll.is_text();

    let overlay_href = |set: fn(&mut ViewQuery, String)| {
        let mut query = panels.clone();
        set(&mut query, poll.id.to_string());
        ViewState::href(BASE, &query)
    };

    let (detail_href, detail_label) = toggle_link(
        Role::Admin.base_path(),
        &state.detail,
        &poll.id,
        panels.clone(),
        |q, v| q.detail = v,
    );

    AdminCard {
        id: poll.id.to_string(),
        title: poll.title.clone(),
        description: poll.description().unwrap_or_default().to_string(),
        is_text,
        bars: if is_text { Vec::new() } else { result_bars(poll) },
        meta_kind: if is_text {
            "Text Response".to_string()
        } else {
            format!("{} candidates", poll.options.len())
        },
        meta_total: format!("{total} {}", if is_text { "responses" } else { "votes" }),
        short_id: poll.short_id(),
        edit_href: overlay_href(|q, id| q.edit = Some(id)),
        delete_href: overlay_href(|q, id| q.delete = Some(id)),
        clear_href: overlay_href(|q, id| q.clear = Some(id)),
        detail_href,
        detail_label,
        export_href: ExportLink::PollVotes(poll.id.clone()).href(public_base),
        detail: data.map(|d| detail_panel(is_text, d)),
    }
}

/// Options by votes, highest first. Empty when nobody has voted.
pub fn result_bars(poll: &Poll) -> Vec<ResultBar> {
    let total = poll.total_votes();
    if total == 0 {
        return Vec::new();
    }

    let mut options: Vec<_> = poll.options.iter().collect();
    options.sort_by(|a, b| b.votes.cmp(&a.votes));

    options
        .into_iter()
        .enumerate()
        .map(|(i, o)| ResultBar {
            name: o.name.clone(),
            votes: o.votes,
            percent: format!("{:.1}", o.votes as f64 / total as f64 * 100.0),
            winner: i == 0 && o.votes > 0,
        })
        .collect()
}

fn detail_panel(is_text: bool, data: DetailData) -> DetailPanel {
    let empty_message = if is_text {
        "📭 No responses yet for this poll."
    } else {
        "📭 No votes yet for this poll."
    };
    let mut panel = DetailPanel {
        is_text,
        error: None,
        heading: String::new(),
        empty_message,
        groups: Vec::new(),
        history: Vec::new(),
        responses: Vec::new(),
    };

    match data {
        DetailData::Votes(votes) => {
            panel.heading = format!("📊 Vote Details ({} total)", votes.len());
            panel.groups = group_by_option(&votes);
            panel.history = votes
                .into_iter()
                .map(|v| VoteRow {
                    username: v.username,
                    option_name: v.option_name,
                })
                .collect();
        }
        DetailData::Responses(responses) => {
            panel.heading = format!("📝 Text Responses ({} total)", responses.len());
            panel.responses = responses
                .into_iter()
                .map(|r| ResponseRow {
                    time: r.created_at.as_deref().map(format_timestamp).unwrap_or_default(),
                    username: r.username,
                    text: r.response_text,
                })
                .collect();
        }
        DetailData::Failed(message) => panel.error = Some(message),
    }
    panel
}

fn create_form_for(draft: &PollDraft, cancel_href: String) -> DraftForm {
    DraftForm {
        heading: "Create New Poll",
        action: "/admin/polls".to_string(),
        cancel_href,
        submit_label: "Save Poll",
        title: draft.title.clone(),
        description: draft.description.clone(),
        is_text: draft.poll_type == PollType::TextResponse,
        options_text: draft.options.join("\n"),
        option_rows: Vec::new(),
    }
}

fn edit_dialog_for(id: &Id, draft: &PollDraft, cancel_href: String) -> DraftForm {
    DraftForm {
        heading: "Edit Poll",
        action: format!("/admin/polls/{}", id.path_segment()),
        cancel_href,
        submit_label: "Save Changes",
        title: draft.title.clone(),
        description: draft.description.clone(),
        is_text: draft.poll_type == PollType::TextResponse,
        options_text: String::new(),
        option_rows: draft
            .options
            .iter()
            .enumerate()
            .map(|(index, value)| OptionRow {
                index,
                value: value.clone(),
            })
            .collect(),
    }
}
