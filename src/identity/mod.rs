//! Browser-scoped client identity: the remembered username and the
//! "already voted" markers.
//!
//! Storage is abstracted behind [`KeyValueStore`]. In the running app the
//! store is the encrypted session cookie, so identity lives in the browser
//! and survives restarts of the portal itself.

use std::cell::RefCell;
use std::collections::HashMap;

use actix_session::Session;

use crate::models::poll::Id;

pub const USERNAME_KEY: &str = "polls-intra-username";
const VOTED_TAG: &str = "poll-voted";
const ANON: &str = "anon";

/// Opaque string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

impl KeyValueStore for Session {
    fn get(&self, key: &str) -> Option<String> {
        Session::get::<String>(self, key).unwrap_or(None)
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = Session::insert(self, key, value) {
            log::warn!("Failed to store '{key}' in session: {e}");
        }
    }

    fn remove(&self, key: &str) {
        Session::remove(self, key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }
}

/// In-process store, used where no browser is involved.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// Marker key for (poll, username). The key is a JSON array so both parts
/// can be recovered exactly, whatever characters they contain.
fn voted_key(poll_id: &Id, username: Option<&str>) -> String {
    let user = username.map(str::trim).filter(|u| !u.is_empty()).unwrap_or(ANON);
    serde_json::json!([VOTED_TAG, poll_id.to_string(), user]).to_string()
}

/// Username component of a marker key, or `None` for foreign keys.
fn marker_username(key: &str) -> Option<String> {
    let parts: Vec<String> = serde_json::from_str(key).ok()?;
    match parts.as_slice() {
        [tag, _poll, user] if tag == VOTED_TAG => Some(user.clone()),
        _ => None,
    }
}

/// Identity loaded from a store. The username is read once at load; every
/// change is written straight through to the store.
pub struct ClientIdentity<S: KeyValueStore> {
    store: S,
    username: Option<String>,
}

impl<S: KeyValueStore> ClientIdentity<S> {
    pub fn load(store: S) -> Self {
        let username = store
            .get(USERNAME_KEY)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Self { store, username }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Remember a username. Blank input is rejected and leaves the stored
    /// value untouched.
    pub fn set_username(&mut self, name: &str) -> Result<(), String> {
        let name = name.trim();
        if let Some(e) = crate::auth::validate::validate_username(name) {
            return Err(e);
        }
        self.store.set(USERNAME_KEY, name);
        self.username = Some(name.to_string());
        Ok(())
    }

    pub fn has_voted(&self, poll_id: &Id, username: Option<&str>) -> bool {
        self.store.get(&voted_key(poll_id, username)).is_some()
    }

    pub fn mark_voted(&self, poll_id: &Id, username: Option<&str>) {
        self.store.set(&voted_key(poll_id, username), "true");
    }

    /// Forget the username and the markers recorded under it. Markers of
    /// other usernames are kept.
    pub fn clear_identity(&mut self, username: &str) {
        let username = username.trim();
        for key in self.store.keys() {
            if marker_username(&key).as_deref() == Some(username) {
                self.store.remove(&key);
            }
        }
        self.store.remove(USERNAME_KEY);
        self.username = None;
    }
}
