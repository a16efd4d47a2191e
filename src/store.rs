//! Storage backends for saved games and session registration.
//!
//! `GameStore` is the seam between the game loop and whatever actually holds
//! the bytes. Backends store the save as a JSON document keyed by user id,
//! plus a single session token per user for multi-tab fencing.

use std::collections::HashMap;

use thiserror::Error;

use crate::save::SavedGameState;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached (storage denied, offline, ...).
    #[error("store unavailable")]
    Unavailable,
    /// A stored document failed to parse.
    #[error("malformed save document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Backend-specific failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence backend for one or more users' saves and session tokens.
pub trait GameStore {
    /// Load the saved document for `user_id`, if any.
    fn load(&self, user_id: &str) -> Result<Option<SavedGameState>, StoreError>;

    /// Write the saved document for `user_id`.
    fn save(&mut self, user_id: &str, saved: &SavedGameState) -> Result<(), StoreError>;

    /// Record `token` as the newest session for `user_id`, displacing any
    /// previous one.
    fn register_session(&mut self, user_id: &str, token: &str) -> Result<(), StoreError>;

    /// The most recently registered session token for `user_id`, if any.
    fn latest_session(&self, user_id: &str) -> Result<Option<String>, StoreError>;
}

/// In-memory backend. Documents are held as serialized JSON so that every
/// load exercises the same parse path a real backend would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
    sessions: HashMap<String, String>,
    write_counter: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON for a user. Test hook.
    pub fn raw_document(&self, user_id: &str) -> Option<&str> {
        self.documents.get(user_id).map(String::as_str)
    }

    /// Replace a user's stored JSON wholesale. Test hook for seeding
    /// documents in older formats.
    pub fn put_raw_document(&mut self, user_id: &str, json: &str) {
        self.documents.insert(user_id.to_owned(), json.to_owned());
    }
}

impl GameStore for MemoryStore {
    fn load(&self, user_id: &str) -> Result<Option<SavedGameState>, StoreError> {
        match self.documents.get(user_id) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, user_id: &str, saved: &SavedGameState) -> Result<(), StoreError> {
        self.write_counter += 1;
        let mut stamped = saved.clone();
        stamped.last_updated_server_time = Some(self.write_counter as f64);
        let json = serde_json::to_string(&stamped)?;
        self.documents.insert(user_id.to_owned(), json);
        Ok(())
    }

    fn register_session(&mut self, user_id: &str, token: &str) -> Result<(), StoreError> {
        self.sessions.insert(user_id.to_owned(), token.to_owned());
        Ok(())
    }

    fn latest_session(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.sessions.get(user_id).cloned())
    }
}

/// Browser localStorage backend.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .ok_or(StoreError::Unavailable)?
            .local_storage()
            .map_err(|_| StoreError::Unavailable)?
            .ok_or(StoreError::Unavailable)?;
        Ok(Self { storage })
    }

    fn state_key(user_id: &str) -> String {
        format!("cosmo-company/{user_id}/state")
    }

    fn session_key(user_id: &str) -> String {
        format!("cosmo-company/{user_id}/session")
    }
}

#[cfg(target_arch = "wasm32")]
impl GameStore for LocalStorageStore {
    fn load(&self, user_id: &str) -> Result<Option<SavedGameState>, StoreError> {
        let item = self
            .storage
            .get_item(&Self::state_key(user_id))
            .map_err(|_| StoreError::Unavailable)?;
        match item {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, user_id: &str, saved: &SavedGameState) -> Result<(), StoreError> {
        let mut stamped = saved.clone();
        stamped.last_updated_server_time = Some(js_sys::Date::now());
        let json = serde_json::to_string(&stamped)?;
        self.storage
            .set_item(&Self::state_key(user_id), &json)
            .map_err(|_| StoreError::Backend("localStorage write rejected".into()))
    }

    fn register_session(&mut self, user_id: &str, token: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(&Self::session_key(user_id), token)
            .map_err(|_| StoreError::Backend("localStorage write rejected".into()))
    }

    fn latest_session(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(&Self::session_key(user_id))
            .map_err(|_| StoreError::Unavailable)
    }
}
