use std::fmt;

use reqwest::StatusCode;

/// Failure of a single backend call.
#[derive(Debug)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, reset, ...).
    Transport(reqwest::Error),
    /// Non-2xx response. `message` is the `error` field of the body, if any.
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    /// A 2xx response whose body did not match the expected shape.
    Decode(String),
}

impl GatewayError {
    /// Text for the user-facing notification: the server's own message when it
    /// sent one, otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            GatewayError::Api {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            GatewayError::Transport(e) => e.status(),
            GatewayError::Decode(_) => None,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(e) => write!(f, "Backend unreachable: {e}"),
            GatewayError::Api {
                status,
                message: Some(m),
            } => write!(f, "Backend error {status}: {m}"),
            GatewayError::Api {
                status,
                message: None,
            } => write!(f, "Backend error {status}"),
            GatewayError::Decode(e) => write!(f, "Unexpected backend response: {e}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Transport(e)
        }
    }
}
