//! Shared test infrastructure for the portal integration tests.
//!
//! # Fake backend
//! - `FakeBackend::start()` - in-process poll API on an ephemeral port that
//!   keeps polls, votes and responses in memory and records every request
//!
//! # Portal
//! - `start_portal()` - the real route table wired to a backend URL
//! - `Browser` - HTTP client with a cookie jar that picks up CSRF tokens from
//!   rendered pages, standing in for a user's browser

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use regex::Regex;
use serde_json::{Value, json};

use pollboard::config::Config;
use pollboard::gateway::PollGateway;
use pollboard::{routes, session_middleware};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Cookie the fake backend treats as a logged-in admin session.
pub const ADMIN_COOKIE: &str = "session=admin-token";
pub const PUBLIC_API_URL: &str = "http://polls.test";

// ============================================================================
// FAKE BACKEND
// ============================================================================

#[derive(Debug, Clone)]
pub struct FakePoll {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub poll_type: String,
    pub options: Vec<(i64, String)>,
}

#[derive(Debug, Clone)]
pub struct FakeVote {
    pub poll_id: i64,
    pub option_id: i64,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub poll_id: i64,
    pub username: String,
    pub text: String,
}

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub cookie: Option<String>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub polls: Vec<FakePoll>,
    pub votes: Vec<FakeVote>,
    pub responses: Vec<FakeResponse>,
    pub requests: Vec<Recorded>,
    /// Make `GET /api/polls` answer 500.
    pub fail_list: bool,
    /// Make every vote answer 500 without a message.
    pub fail_votes: bool,
    /// Send ids as JSON strings and accept only string option ids back.
    pub string_ids: bool,
    next_id: i64,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn wire_id(&self, id: i64) -> Value {
        if self.string_ids { json!(id.to_string()) } else { json!(id) }
    }

    fn poll_json(&self, poll: &FakePoll) -> Value {
        let options: Vec<Value> = poll
            .options
            .iter()
            .map(|(id, name)| {
                let votes = self.votes.iter().filter(|v| v.option_id == *id).count();
                json!({ "id": self.wire_id(*id), "name": name, "votes": votes })
            })
            .collect();
        json!({
            "id": self.wire_id(poll.id),
            "title": poll.title,
            "description": poll.description,
            "poll_type": poll.poll_type,
            "opensLabel": "Opened today",
            "closesLabel": "Closes in 2 days",
            "options": options,
        })
    }

    fn insert_poll(&mut self, title: &str, description: &str, poll_type: &str, options: &[String]) -> i64 {
        let id = self.next_id();
        let options = options
            .iter()
            .map(|name| (self.next_id(), name.clone()))
            .collect();
        self.polls.push(FakePoll {
            id,
            title: title.to_string(),
            description: description.to_string(),
            poll_type: poll_type.to_string(),
            options,
        });
        id
    }
}

pub struct FakeBackend {
    pub url: String,
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Start the fake API on 127.0.0.1 with an OS-assigned port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let data = web::Data::new(state.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(handle))
        })
        .workers(1)
        .bind("127.0.0.1:0")
        .expect("Failed to bind fake backend");

        let addr = server.addrs()[0];
        actix_rt::spawn(server.run());

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn add_poll(&self, title: &str, options: &[&str]) -> i64 {
        let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        self.state
            .lock()
            .unwrap()
            .insert_poll(title, "", "multiple_choice", &options)
    }

    pub fn add_text_poll(&self, title: &str) -> i64 {
        self.state
            .lock()
            .unwrap()
            .insert_poll(title, "", "text_response", &[])
    }

    pub fn option_id(&self, poll_id: i64, name: &str) -> i64 {
        let state = self.state.lock().unwrap();
        let poll = state.polls.iter().find(|p| p.id == poll_id).expect("No such poll");
        poll.options
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| *id)
            .expect("No such option")
    }

    pub fn add_vote(&self, poll_id: i64, option: &str, username: &str) {
        let option_id = self.option_id(poll_id, option);
        self.state.lock().unwrap().votes.push(FakeVote {
            poll_id,
            option_id,
            username: username.to_string(),
        });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of requests with this method and path.
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn polls(&self) -> Vec<FakePoll> {
        self.state.lock().unwrap().polls.clone()
    }

    pub fn votes(&self) -> Vec<FakeVote> {
        self.state.lock().unwrap().votes.clone()
    }

    pub fn responses(&self) -> Vec<FakeResponse> {
        self.state.lock().unwrap().responses.clone()
    }
}

fn error(status: u16, message: &str) -> HttpResponse {
    HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap())
        .json(json!({ "error": message }))
}

fn str_field<'a>(body: &'a Option<Value>, key: &str) -> &'a str {
    body.as_ref()
        .and_then(|b| b.get(key))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn option_names(body: &Option<Value>) -> Vec<String> {
    body.as_ref()
        .and_then(|b| b.get("options"))
        .and_then(Value::as_array)
        .map(|opts| {
            opts.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

async fn handle(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<Arc<Mutex<FakeState>>>,
) -> HttpResponse {
    let method = req.method().to_string();
    let path = req.path().to_string();
    let cookie = req
        .headers()
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let is_admin = cookie.as_deref().is_some_and(|c| c.contains(ADMIN_COOKIE));

    let mut state = state.lock().unwrap();
    state.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        body: body.clone(),
        cookie,
    });

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let poll_id = segments.get(2).and_then(|s| s.parse::<i64>().ok());
    let admin_only = matches!(
        (method.as_str(), segments.as_slice()),
        ("POST", ["api", "polls"]) | ("PUT", _) | ("DELETE", _)
    );
    if admin_only && !is_admin {
        return error(401, "Unauthorized");
    }

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["api", "polls"]) => {
            if state.fail_list {
                return error(500, "database unavailable");
            }
            let polls: Vec<Value> = state.polls.iter().map(|p| state.poll_json(p)).collect();
            HttpResponse::Ok().json(json!({ "polls": polls }))
        }
        ("POST", ["api", "polls"]) => {
            let title = str_field(&body, "title").trim().to_string();
            let poll_type = str_field(&body, "poll_type").to_string();
            let options = option_names(&body);
            if title.is_empty() {
                return error(400, "Title is required");
            }
            if poll_type != "text_response" && options.len() < 2 {
                return error(400, "At least two options are required");
            }
            let description = str_field(&body, "description").to_string();
            let id = state.insert_poll(&title, &description, &poll_type, &options);
            HttpResponse::Created().json(json!({ "id": id }))
        }
        ("PUT", ["api", "polls", _]) => {
            let Some(idx) = state.polls.iter().position(|p| Some(p.id) == poll_id) else {
                return error(404, "Poll not found");
            };
            let title = str_field(&body, "title").trim().to_string();
            if title.is_empty() {
                return error(400, "Title is required");
            }
            let existing = state.polls[idx].options.clone();
            let mut options = Vec::new();
            for name in option_names(&body) {
                let id = match existing.iter().find(|(_, n)| *n == name) {
                    Some((id, _)) => *id,
                    None => state.next_id(),
                };
                options.push((id, name));
            }
            let description = str_field(&body, "description").to_string();
            let poll_type = str_field(&body, "poll_type").to_string();
            let poll = &mut state.polls[idx];
            poll.title = title;
            poll.description = description;
            poll.poll_type = poll_type;
            poll.options = options;
            HttpResponse::Ok().json(json!({ "status": "updated" }))
        }
        ("DELETE", ["api", "polls", _]) => {
            let before = state.polls.len();
            state.polls.retain(|p| Some(p.id) != poll_id);
            if state.polls.len() == before {
                return error(404, "Poll not found");
            }
            state.votes.retain(|v| Some(v.poll_id) != poll_id);
            HttpResponse::Ok().json(json!({ "status": "deleted" }))
        }
        ("DELETE", ["api", "polls", _, "votes"]) => {
            state.votes.retain(|v| Some(v.poll_id) != poll_id);
            state.responses.retain(|r| Some(r.poll_id) != poll_id);
            HttpResponse::Ok().json(json!({ "status": "cleared" }))
        }
        ("POST", ["api", "polls", _, "vote"]) => {
            if state.fail_votes {
                return HttpResponse::InternalServerError().finish();
            }
            let Some(poll_id) = poll_id else {
                return error(404, "Poll not found");
            };
            let username = str_field(&body, "username").to_string();
            let raw = body.as_ref().and_then(|b| b.get("option_id"));
            let option_id = if state.string_ids {
                raw.and_then(Value::as_str).and_then(|s| s.parse::<i64>().ok())
            } else {
                raw.and_then(Value::as_i64)
            };
            if state
                .votes
                .iter()
                .any(|v| v.poll_id == poll_id && v.username == username)
            {
                return error(400, "You have already voted on this poll.");
            }
            let valid = state
                .polls
                .iter()
                .find(|p| p.id == poll_id)
                .is_some_and(|p| p.options.iter().any(|(id, _)| Some(*id) == option_id));
            let Some(option_id) = option_id.filter(|_| valid) else {
                return error(400, "Invalid option");
            };
            state.votes.push(FakeVote {
                poll_id,
                option_id,
                username,
            });
            HttpResponse::Ok().json(json!({ "status": "ok" }))
        }
        ("POST", ["api", "polls", _, "text-response"]) => {
            let Some(poll_id) = poll_id else {
                return error(404, "Poll not found");
            };
            let username = str_field(&body, "username").to_string();
            if state
                .responses
                .iter()
                .any(|r| r.poll_id == poll_id && r.username == username)
            {
                return error(400, "You have already responded to this poll.");
            }
            let text = str_field(&body, "response_text").to_string();
            state.responses.push(FakeResponse {
                poll_id,
                username,
                text,
            });
            HttpResponse::Ok().json(json!({ "status": "ok" }))
        }
        ("GET", ["api", "polls", _, "votes"]) => {
            let votes: Vec<Value> = state
                .votes
                .iter()
                .filter(|v| Some(v.poll_id) == poll_id)
                .map(|v| {
                    let name = state
                        .polls
                        .iter()
                        .flat_map(|p| p.options.iter())
                        .find(|(id, _)| *id == v.option_id)
                        .map(|(_, n)| n.clone())
                        .unwrap_or_default();
                    json!({ "username": v.username, "optionId": v.option_id, "optionName": name })
                })
                .collect();
            HttpResponse::Ok().json(json!({ "pollId": poll_id, "votes": votes }))
        }
        ("GET", ["api", "polls", _, "text-responses"]) => {
            let responses: Vec<Value> = state
                .responses
                .iter()
                .filter(|r| Some(r.poll_id) == poll_id)
                .map(|r| {
                    json!({
                        "username": r.username,
                        "response_text": r.text,
                        "created_at": "2025-03-01T09:15:42.123456+00:00",
                    })
                })
                .collect();
            HttpResponse::Ok().json(json!({ "responses": responses }))
        }
        ("GET", ["api", "admin", "check"]) => {
            HttpResponse::Ok().json(json!({ "logged_in": is_admin }))
        }
        ("POST", ["api", "admin", "logout"]) => HttpResponse::Ok()
            .insert_header(("Set-Cookie", "session=; Max-Age=0; Path=/"))
            .json(json!({ "status": "logged out" })),
        _ => error(404, "Not found"),
    }
}

// ============================================================================
// PORTAL
// ============================================================================

/// Start the portal against `backend_url` and return its base URL.
pub async fn start_portal(backend_url: &str) -> String {
    let backend_url = backend_url.to_string();
    let config = Config::from_lookup(|key| match key {
        "API_BASE_URL" => Some(backend_url.clone()),
        "API_PUBLIC_URL" => Some(PUBLIC_API_URL.to_string()),
        _ => None,
    });
    let gateway = PollGateway::new(reqwest::Client::new(), &config.api_base_url);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(&config))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(routes::config_routes)
            .default_service(web::to(routes::not_found))
    })
    .workers(1)
    .bind("127.0.0.1:0")
    .expect("Failed to bind portal");

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{addr}")
}

/// Backend and portal, wired together.
pub async fn setup() -> (FakeBackend, String) {
    let backend = FakeBackend::start().await;
    let portal = start_portal(&backend.url).await;
    (backend, portal)
}

// ============================================================================
// BROWSER
// ============================================================================

#[derive(Debug)]
pub struct Page {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

impl Page {
    /// Rendered text of the open notice dialog, if any.
    pub fn notice(&self) -> Option<String> {
        let re = Regex::new(r#"(?s)<p class="notice-message">(.*?)</p>"#).unwrap();
        re.captures(&self.body).map(|c| c[1].to_string())
    }

    /// Poll titles in the order the page shows them.
    pub fn titles(&self) -> Vec<String> {
        let re = Regex::new(r#"<(?:h3 class="poll-title"|div class="admin-poll-title")>([^<]*)<"#).unwrap();
        re.captures_iter(&self.body)
            .map(|c| c[1].to_string())
            .filter(|t| t != "ENTER_INTRA_USERNAME")
            .collect()
    }

    /// An expanded card offers its choices with an enabled submit button.
    pub fn can_vote(&self) -> bool {
        self.body.contains("name=\"option_id\"") && !self.body.contains(" disabled>")
    }
}

/// A browser session: cookie jar plus the last CSRF token seen.
pub struct Browser {
    http: reqwest::Client,
    base: String,
    cookies: Vec<(String, String)>,
    csrf: Option<String>,
}

impl Browser {
    pub fn new(base: &str) -> Self {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build test client");
        Self {
            http,
            base: base.to_string(),
            cookies: Vec::new(),
            csrf: None,
        }
    }

    /// A browser that also holds the backend's admin session cookie, as it
    /// would when portal and backend share an origin.
    pub fn admin(base: &str) -> Self {
        let mut browser = Self::new(base);
        browser.set_cookie("session", "admin-token");
        browser
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.retain(|(n, _)| n != name);
        if !value.is_empty() {
            self.cookies.push((name.to_string(), value.to_string()));
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub async fn get(&mut self, path: &str) -> Page {
        let req = self.http.get(format!("{}{}", self.base, path));
        self.send(req).await
    }

    /// POST a form, adding the CSRF token unless the fields carry one.
    pub async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> Page {
        let mut fields: Vec<(&str, &str)> = fields.to_vec();
        let token = self.csrf.clone().unwrap_or_default();
        if !fields.iter().any(|(k, _)| *k == "csrf_token") {
            fields.push(("csrf_token", &token));
        }
        let body = serde_urlencoded::to_string(&fields).expect("Failed to encode form");
        let req = self
            .http
            .post(format!("{}{}", self.base, path))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body);
        self.send(req).await
    }

    /// POST, then follow a local redirect the way a browser would.
    pub async fn submit(&mut self, path: &str, fields: &[(&str, &str)]) -> Page {
        let page = self.post(path, fields).await;
        match page.location.clone() {
            Some(location) if page.status == 303 && location.starts_with('/') => {
                self.get(&location).await
            }
            _ => page,
        }
    }

    async fn send(&mut self, req: reqwest::RequestBuilder) -> Page {
        let req = if self.cookies.is_empty() {
            req
        } else {
            let header = self
                .cookies
                .iter()
                .map(|(n, v)| format!("{n}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            req.header("cookie", header)
        };

        let resp = req.send().await.expect("Portal request failed");
        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        for set_cookie in resp.headers().get_all("set-cookie") {
            let Ok(raw) = set_cookie.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or("");
            if let Some((name, value)) = pair.split_once('=') {
                let expired = raw.to_ascii_lowercase().contains("max-age=0");
                self.set_cookie(name.trim(), if expired { "" } else { value.trim() });
            }
        }

        let body = resp.text().await.expect("Failed to read portal body");
        let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]+)""#).unwrap();
        if let Some(c) = re.captures(&body) {
            self.csrf = Some(c[1].to_string());
        }

        Page {
            status,
            location,
            body,
        }
    }
}
