//! Typed client for the poll backend API.
//!
//! Every operation issues exactly one request and resolves to the parsed
//! payload or a [`GatewayError`]. Nothing is retried; callers surface the
//! error to the user and re-fetch after every mutation.

mod error;
mod export;

pub use error::GatewayError;
pub use export::ExportLink;

use reqwest::header::{self, HeaderMap};
use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::models::poll::{Id, Poll, PollList, PollPayload};
use crate::models::vote::{ResponseList, TextResponse, VoteList, VoteRecord};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdminStatus {
    #[serde(default)]
    logged_in: bool,
}

#[derive(Clone)]
pub struct PollGateway {
    http: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl PollGateway {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: None,
        }
    }

    /// A copy that forwards the browser's `Cookie` header, so the backend sees
    /// the same admin session it would see from a same-origin request.
    pub fn with_cookie(&self, cookie: Option<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            cookie: cookie.filter(|c| !c.trim().is_empty()),
        }
    }

    /// `GET /api/polls`, in payload order.
    pub async fn list_polls(&self) -> Result<Vec<Poll>, GatewayError> {
        let list: PollList = self.execute(Method::GET, "/api/polls".into(), None).await?;
        Ok(list.polls)
    }

    pub async fn create_poll(&self, payload: &PollPayload) -> Result<Value, GatewayError> {
        let body = to_body(payload)?;
        self.execute(Method::POST, "/api/polls".into(), Some(&body)).await
    }

    pub async fn update_poll(&self, poll_id: &Id, payload: &PollPayload) -> Result<Value, GatewayError> {
        let body = to_body(payload)?;
        self.execute(Method::PUT, format!("/api/polls/{}", poll_id.path_segment()), Some(&body))
            .await
    }

    pub async fn delete_poll(&self, poll_id: &Id) -> Result<Value, GatewayError> {
        self.execute(Method::DELETE, format!("/api/polls/{}", poll_id.path_segment()), None)
            .await
    }

    /// Remove every vote of a poll and reset its counts.
    pub async fn clear_votes(&self, poll_id: &Id) -> Result<Value, GatewayError> {
        self.execute(Method::DELETE, format!("/api/polls/{}/votes", poll_id.path_segment()), None)
            .await
    }

    pub async fn cast_vote(
        &self,
        poll_id: &Id,
        option_id: &Id,
        username: &str,
    ) -> Result<Value, GatewayError> {
        let body = json!({ "option_id": option_id, "username": username });
        self.execute(Method::POST, format!("/api/polls/{}/vote", poll_id.path_segment()), Some(&body))
            .await
    }

    pub async fn submit_text_response(
        &self,
        poll_id: &Id,
        response_text: &str,
        username: &str,
    ) -> Result<Value, GatewayError> {
        let body = json!({ "response_text": response_text, "username": username });
        self.execute(
            Method::POST,
            format!("/api/polls/{}/text-response", poll_id.path_segment()),
            Some(&body),
        )
        .await
    }

    pub async fn poll_votes(&self, poll_id: &Id) -> Result<Vec<VoteRecord>, GatewayError> {
        let list: VoteList = self
            .execute(Method::GET, format!("/api/polls/{}/votes", poll_id.path_segment()), None)
            .await?;
        Ok(list.votes)
    }

    pub async fn text_responses(&self, poll_id: &Id) -> Result<Vec<TextResponse>, GatewayError> {
        let list: ResponseList = self
            .execute(
                Method::GET,
                format!("/api/polls/{}/text-responses", poll_id.path_segment()),
                None,
            )
            .await?;
        Ok(list.responses)
    }

    /// Whether the forwarded cookies carry a valid backend admin session.
    pub async fn admin_check(&self) -> Result<bool, GatewayError> {
        let status: AdminStatus = self
            .execute(Method::GET, "/api/admin/check".into(), None)
            .await?;
        Ok(status.logged_in)
    }

    /// End the backend admin session. Returns the backend's `Set-Cookie`
    /// values so the caller can relay them to the browser.
    pub async fn admin_logout(&self) -> Result<Vec<String>, GatewayError> {
        let (headers, _) = self
            .send(Method::POST, "/api/admin/logout".into(), None)
            .await?;
        Ok(headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        body: Option<&Value>,
    ) -> Result<T, GatewayError> {
        let (_, text) = self.send(method.clone(), path.clone(), body).await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            log::warn!("backend {method} {path}: undecodable response: {e}");
            GatewayError::Decode(e.to_string())
        })
    }

    /// Issue one request and return the headers and body of a 2xx response.
    async fn send(
        &self,
        method: Method,
        path: String,
        body: Option<&Value>,
    ) -> Result<(HeaderMap, String), GatewayError> {
        log::debug!("backend {method} {path}");

        let mut req = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path));
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let result: Result<(HeaderMap, String), GatewayError> = async {
            let resp = req.send().await.map_err(GatewayError::Transport)?;
            let status = resp.status();
            let headers = resp.headers().clone();
            let text = resp.text().await?;

            if !status.is_success() {
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .ok()
                    .and_then(|b| b.error);
                return Err(GatewayError::Api { status, message });
            }
            Ok((headers, text))
        }
        .await;

        if let Err(e) = &result {
            log::warn!("backend {method} {path} failed: {e}");
        }
        result
    }
}

fn to_body(payload: &PollPayload) -> Result<Value, GatewayError> {
    serde_json::to_value(payload).map_err(|e| GatewayError::Decode(e.to_string()))
}
