use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::csrf;
use crate::config::Config;
use crate::errors::{AppError, render};
use crate::gateway::PollGateway;
use crate::models::poll::draft::field;
use crate::models::poll::{Id, Poll, PollDraft};
use crate::render::{DetailData, admin_page};
use crate::templates_structs::PageContext;
use crate::views::{Overlay, Role, ViewQuery, ViewState};

use super::{CsrfOnly, forwarded_cookie, notify, redirect};

const ADMIN_HOME: &str = "/admin";

/// What an edit-dialog submission asks for.
#[derive(Debug, PartialEq)]
enum EditIntent {
    Save,
    AddRow,
    RemoveRow(usize),
}

impl EditIntent {
    fn parse(raw: &str) -> Self {
        match raw {
            "add_row" => EditIntent::AddRow,
            other => other
                .strip_prefix("remove:")
                .and_then(|idx| idx.parse().ok())
                .map_or(EditIntent::Save, EditIntent::RemoveRow),
        }
    }
}

fn admin_gateway(gateway: &PollGateway, req: &HttpRequest) -> PollGateway {
    gateway.with_cookie(forwarded_cookie(req))
}

/// Fetch, order and render the admin page. `overlay` replaces whatever the
/// query string asks for, used when a submitted form is shown again.
async fn admin_view(
    gateway: &PollGateway,
    config: &Config,
    ctx: PageContext,
    query: &ViewQuery,
    overlay: Option<(Overlay, PollDraft)>,
) -> Result<HttpResponse, AppError> {
    let mut ctx = ctx;
    let polls = match gateway.list_polls().await {
        Ok(polls) => polls,
        Err(_) => {
            if ctx.notice.is_none() {
                ctx = ctx.with_notice("Failed to load polls from server".to_string());
            }
            Vec::new()
        }
    };

    let mut state = ViewState::new(polls, None, query);
    if let Some((overlay, draft)) = overlay {
        state = state.with_overlay(overlay, Some(draft));
    }

    let detail = match state.detail.expanded_id().and_then(|id| state.poll(id)) {
        Some(poll) => Some(fetch_detail(gateway, poll).await),
        None => None,
    };

    render(admin_page(ctx, &state, detail, &config.api_public_url))
}

async fn fetch_detail(gateway: &PollGateway, poll: &Poll) -> DetailData {
    if poll.is_text() {
        match gateway.text_responses(&poll.id).await {
            Ok(responses) => DetailData::Responses(responses),
            Err(e) => DetailData::Failed(e.user_message("Failed to load responses")),
        }
    } else {
        match gateway.poll_votes(&poll.id).await {
            Ok(votes) => DetailData::Votes(votes),
            Err(e) => DetailData::Failed(e.user_message("Failed to load votes")),
        }
    }
}

pub async fn index(
    req: HttpRequest,
    gateway: web::Data<PollGateway>,
    config: web::Data<Config>,
    session: Session,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, AppError> {
    let gateway = admin_gateway(&gateway, &req);

    match gateway.admin_check().await {
        Ok(true) => {}
        Ok(false) => return Ok(redirect(&config.admin_login_url())),
        // Unreachable backend: the page still renders and reports the failed load.
        Err(e) => log::warn!("Admin session check failed: {e}"),
    }

    let ctx = PageContext::build(&session, Role::Admin, None);
    admin_view(&gateway, &config, ctx, &query, None).await
}

pub async fn create(
    req: HttpRequest,
    gateway: web::Data<PollGateway>,
    config: web::Data<Config>,
    session: Session,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let params = form.into_inner();
    csrf::validate_csrf(&session, field(&params, "csrf_token"))?;
    let gateway = admin_gateway(&gateway, &req);

    let draft = PollDraft::from_fields(&params);
    let result = match draft.validate() {
        Ok(payload) => gateway
            .create_poll(&payload)
            .await
            .map(|_| payload.title)
            .map_err(|e| e.user_message("Failed to create poll")),
        Err(msg) => Err(msg),
    };

    match result {
        Ok(title) => {
            log::info!("Created poll '{title}'");
            Ok(redirect(ADMIN_HOME))
        }
        Err(msg) => {
            let ctx = PageContext::build(&session, Role::Admin, None).with_notice(msg);
            admin_view(&gateway, &config, ctx, &ViewQuery::default(), Some((Overlay::Create, draft))).await
        }
    }
}

/// Edit dialog submission: save, or add/remove an option row and show the
/// dialog again.
pub async fn update(
    req: HttpRequest,
    gateway: web::Data<PollGateway>,
    config: web::Data<Config>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let params = form.into_inner();
    csrf::validate_csrf(&session, field(&params, "csrf_token"))?;
    let gateway = admin_gateway(&gateway, &req);
    let poll_id = Id::from_param(&path);
    let mut draft = PollDraft::from_fields(&params);

    let result = match EditIntent::parse(field(&params, "intent")) {
        EditIntent::AddRow => {
            draft.add_row();
            Err(None)
        }
        EditIntent::RemoveRow(index) => {
            draft.remove_row(index);
            Err(None)
        }
        EditIntent::Save => match draft.validate() {
            Ok(payload) => gateway
                .update_poll(&poll_id, &payload)
                .await
                .map_err(|e| Some(e.user_message("Failed to update poll"))),
            Err(msg) => Err(Some(msg)),
        },
    };

    match result {
        Ok(_) => {
            log::info!("Updated poll {poll_id}");
            Ok(redirect(ADMIN_HOME))
        }
        Err(notice) => {
            let mut ctx = PageContext::build(&session, Role::Admin, None);
            if let Some(msg) = notice {
                ctx = ctx.with_notice(msg);
            }
            let overlay = (Overlay::Edit(poll_id), draft);
            admin_view(&gateway, &config, ctx, &ViewQuery::default(), Some(overlay)).await
        }
    }
}

pub async fn delete(
    req: HttpRequest,
    gateway: web::Data<PollGateway>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let poll_id = Id::from_param(&path);

    match admin_gateway(&gateway, &req).delete_poll(&poll_id).await {
        Ok(_) => {
            log::info!("Deleted poll {poll_id}");
            Ok(redirect(ADMIN_HOME))
        }
        Err(e) => Ok(notify(&session, &e.user_message("Failed to delete poll"), ADMIN_HOME)),
    }
}

pub async fn clear_votes(
    req: HttpRequest,
    gateway: web::Data<PollGateway>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let poll_id = Id::from_param(&path);

    match admin_gateway(&gateway, &req).clear_votes(&poll_id).await {
        Ok(_) => {
            log::info!("Cleared votes of poll {poll_id}");
            Ok(redirect(ADMIN_HOME))
        }
        Err(e) => Ok(notify(&session, &e.user_message("Failed to clear votes"), ADMIN_HOME)),
    }
}
