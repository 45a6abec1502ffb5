use crate::models::poll::{Id, Poll};
use crate::templates_structs::{PageContext, StudentCard, StudentOption, StudentTemplate};
use crate::views::{Role, ViewQuery, ViewState};

use super::toggle_link;

/// Build the student page. `has_voted` answers the local voted-marker
/// lookup for the current username.
pub fn student_page(
    ctx: PageContext,
    state: &ViewState,
    has_voted: impl Fn(&Id) -> bool,
) -> StudentTemplate {
    if state.username.is_none() {
        return StudentTemplate {
            ctx,
            needs_username: true,
            active_count: 0,
            cards: Vec::new(),
        };
    }

    let cards = state
        .polls
        .iter()
        .map(|poll| card(poll, state, has_voted(&poll.id)))
        .collect();

    StudentTemplate {
        ctx,
        needs_username: false,
        active_count: state.polls.len(),
        cards,
    }
}

fn card(poll: &Poll, state: &ViewState, voted: bool) -> StudentCard {
    let (toggle_href, toggle_label) = toggle_link(
        Role::Student.base_path(),
        &state.panel,
        &poll.id,
        ViewQuery::default(),
        |q, v| q.open = v,
    );

    let is_text = poll.is_text();
    let (kind_label, kind_value, count_label) = if is_text {
        ("TYPE", "TEXT".to_string(), "RESP")
    } else {
        ("CAND", poll.options.len().to_string(), "VOTES")
    };

    let (submit_action, thank_you) = if is_text {
        (format!("/polls/{}/respond", poll.id.path_segment()), "✅ Thank you for your response!")
    } else {
        (format!("/polls/{}/vote", poll.id.path_segment()), "✅ Thank you for voting!")
    };

    StudentCard {
        id: poll.id.to_string(),
        title: poll.title.clone(),
        description: poll.description().map(str::to_string),
        is_text,
        kind_label,
        kind_value,
        count_label,
        closes_label: poll.closes_label.clone().unwrap_or_default(),
        expanded: state.panel.is_expanded(&poll.id),
        toggle_href,
        toggle_label,
        voted,
        thank_you,
        options: poll
            .options
            .iter()
            .map(|o| StudentOption {
                id: o.id.to_string(),
                name: o.name.clone(),
            })
            .collect(),
        submit_action,
        submit_label: if voted { "VOTED" } else { "> VOTE" },
    }
}
