use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::csrf;
use crate::errors::{AppError, render};
use crate::gateway::PollGateway;
use crate::identity::ClientIdentity;
use crate::models::poll::Id;
use crate::models::poll::draft::{validate_response_text, validate_selection};
use crate::render::student_page;
use crate::templates_structs::PageContext;
use crate::views::{Role, ViewQuery, ViewState};

use super::{CsrfOnly, notify, redirect};

#[derive(Deserialize)]
pub struct UsernameForm {
    #[serde(default)]
    pub username: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub option_id: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct RespondForm {
    #[serde(default)]
    pub response_text: String,
    pub csrf_token: String,
}

/// Student page with the card of `poll_id` expanded.
fn card_href(poll_id: &Id) -> String {
    ViewState::href(
        Role::Student.base_path(),
        &ViewQuery {
            open: Some(poll_id.to_string()),
            ..Default::default()
        },
    )
}

pub async fn index(
    gateway: web::Data<PollGateway>,
    session: Session,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, AppError> {
    let identity = ClientIdentity::load(&session);
    let username = identity.username().map(str::to_string);
    let mut ctx = PageContext::build(&session, Role::Student, username.clone());

    // The username form blocks everything else, so there is nothing to fetch yet.
    let polls = match &username {
        None => Vec::new(),
        Some(_) => match gateway.list_polls().await {
            Ok(polls) => polls,
            Err(_) => {
                ctx = ctx.with_notice("Failed to load polls from server".to_string());
                Vec::new()
            }
        },
    };

    let state = ViewState::new(polls, username, &query);
    let page = student_page(ctx, &state, |poll_id| {
        identity.has_voted(poll_id, state.username.as_deref())
    });
    render(page)
}

pub async fn capture_username(
    session: Session,
    form: web::Form<UsernameForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut identity = ClientIdentity::load(&session);
    if let Err(msg) = identity.set_username(&form.username) {
        return Ok(notify(&session, &msg, "/"));
    }
    log::info!("Student identified as '{}'", form.username.trim());
    Ok(redirect("/"))
}

pub async fn vote(
    gateway: web::Data<PollGateway>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<VoteForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let poll_id = Id::from_param(&path);
    let identity = ClientIdentity::load(&session);
    let Some(username) = identity.username().map(str::to_string) else {
        return Ok(redirect("/"));
    };
    let back = card_href(&poll_id);

    if identity.has_voted(&poll_id, Some(&username)) {
        return Ok(notify(&session, "You have already voted on this poll.", &back));
    }

    let selected = match validate_selection(&form.option_id) {
        Ok(raw) => Id::from_param(raw),
        Err(msg) => return Ok(notify(&session, &msg, &back)),
    };

    // The backend expects ids in the shape it sent them.
    let polls = match gateway.list_polls().await {
        Ok(polls) => polls,
        Err(e) => return Ok(notify(&session, &e.user_message("Failed to cast vote"), &back)),
    };
    let Some(poll) = polls.iter().find(|p| p.id.matches(&poll_id)) else {
        return Ok(notify(&session, "This poll is no longer available.", "/"));
    };
    let Some(option) = poll.options.iter().find(|o| o.id.matches(&selected)) else {
        return Ok(notify(&session, "The selected option is no longer available.", &back));
    };

    match gateway.cast_vote(&poll.id, &option.id, &username).await {
        Ok(_) => {
            identity.mark_voted(&poll.id, Some(&username));
            log::info!("Vote recorded on poll {poll_id} for '{username}'");
            Ok(redirect("/"))
        }
        Err(e) => Ok(notify(&session, &e.user_message("Failed to cast vote"), &back)),
    }
}

pub async fn respond(
    gateway: web::Data<PollGateway>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<RespondForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let poll_id = Id::from_param(&path);
    let identity = ClientIdentity::load(&session);
    let Some(username) = identity.username().map(str::to_string) else {
        return Ok(redirect("/"));
    };
    let back = card_href(&poll_id);

    if identity.has_voted(&poll_id, Some(&username)) {
        return Ok(notify(&session, "You have already responded to this poll.", &back));
    }

    let text = match validate_response_text(&form.response_text) {
        Ok(text) => text,
        Err(msg) => return Ok(notify(&session, &msg, &back)),
    };

    match gateway.submit_text_response(&poll_id, text, &username).await {
        Ok(_) => {
            identity.mark_voted(&poll_id, Some(&username));
            log::info!("Response recorded on poll {poll_id} for '{username}'");
            Ok(redirect("/"))
        }
        Err(e) => Ok(notify(&session, &e.user_message("Failed to submit response"), &back)),
    }
}

/// Forget the username and its voted markers. Markers of other usernames
/// used in this browser stay.
pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut identity = ClientIdentity::load(&session);
    if let Some(username) = identity.username().map(str::to_string) {
        identity.clear_identity(&username);
        log::info!("Student '{username}' signed out");
    }
    Ok(redirect("/"))
}
