use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, http::header, web};

use crate::auth::csrf;
use crate::config::Config;
use crate::errors::AppError;
use crate::gateway::PollGateway;

use super::{CsrfOnly, forwarded_cookie};

/// End the backend admin session and go to the backend login page. The
/// redirect happens even when the backend call fails.
pub async fn admin_logout(
    req: HttpRequest,
    gateway: web::Data<PollGateway>,
    config: web::Data<Config>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let cookies = match gateway.with_cookie(forwarded_cookie(&req)).admin_logout().await {
        Ok(cookies) => {
            log::info!("Admin signed out");
            cookies
        }
        Err(e) => {
            log::error!("Admin logout failed: {e}");
            Vec::new()
        }
    };

    let mut resp = HttpResponse::SeeOther();
    resp.insert_header(("Location", config.admin_login_url()));
    for cookie in cookies {
        resp.append_header((header::SET_COOKIE, cookie));
    }
    Ok(resp.finish())
}
