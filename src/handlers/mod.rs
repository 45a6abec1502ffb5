pub mod admin_handlers;
pub mod auth_handlers;
pub mod student_handlers;

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, http::header};
use serde::Deserialize;

use crate::auth::session::set_flash;

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// Show `message` as a blocking notice on the page at `location`.
pub(crate) fn notify(session: &Session, message: &str, location: &str) -> HttpResponse {
    set_flash(session, message);
    redirect(location)
}

/// The browser's cookies, passed on to the backend for admin calls.
pub(crate) fn forwarded_cookie(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
