pub mod auth;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod render;
pub mod routes;
pub mod templates_structs;
pub mod views;

use actix_session::config::PersistentSession;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::time::Duration;

use crate::config::Config;

/// Name of the identity cookie. Distinct from the backend's own session
/// cookie, which is forwarded untouched on admin calls.
pub const SESSION_COOKIE: &str = "pollboard";

/// Encrypted cookie session holding the browser's identity.
pub fn session_middleware(config: &Config) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), config.session_key.clone())
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(false)
        .cookie_http_only(true)
        .session_lifecycle(PersistentSession::default().session_ttl(Duration::days(config.session_ttl_days)))
        .build()
}
