use std::env;
use std::fmt::Display;
use std::str::FromStr;

use actix_web::cookie::Key;

/// Runtime settings, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Where the portal reaches the backend.
    pub api_base_url: String,
    /// Backend origin as seen by the browser (CSV links, login redirect).
    pub api_public_url: String,
    pub admin_login_path: String,
    pub session_key: Key,
    pub session_ttl_days: i64,
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = or_default(var("API_BASE_URL"), "API_BASE_URL", "http://127.0.0.1:5001");
        let api_public_url = var("API_PUBLIC_URL").unwrap_or_else(|| {
            log::info!("API_PUBLIC_URL not set, using API_BASE_URL: {api_base_url}");
            api_base_url.clone()
        });

        Self {
            bind_addr: or_default(var("BIND_ADDR"), "BIND_ADDR", "127.0.0.1:8080"),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_public_url: api_public_url.trim_end_matches('/').to_string(),
            admin_login_path: or_default(var("ADMIN_LOGIN_PATH"), "ADMIN_LOGIN_PATH", "/login.html"),
            session_key: session_key(var("SESSION_KEY")),
            session_ttl_days: parse_or_default(var("SESSION_TTL_DAYS"), "SESSION_TTL_DAYS", 365),
        }
    }

    /// Backend login page the admin is sent to when signed out.
    pub fn admin_login_url(&self) -> String {
        format!("{}{}", self.api_public_url, self.admin_login_path)
    }
}

fn or_default(value: Option<String>, key: &str, default: &str) -> String {
    value.unwrap_or_else(|| {
        log::info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or_default<T: FromStr + Display>(value: Option<String>, key: &str, default: T) -> T
where
    T::Err: Display,
{
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            log::warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
        None => {
            log::info!("{key} not set, using default: {default}");
            default
        }
    }
}

/// Session encryption key. Without a persistent key, identity cookies stop
/// decrypting whenever the process restarts.
fn session_key(value: Option<String>) -> Key {
    match value {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (identities lost on restart)");
            Key::generate()
        }
    }
}
