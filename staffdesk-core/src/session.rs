//! Persistent session store
//!
//! Single source of truth for "am I logged in, and as whom". The in-memory
//! session lives in a `watch` channel so any number of consumers can observe
//! it; every mutation is mirrored into durable storage.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::storage::{KeyValueStore, StorageError};

/// Durable entry holding the raw bearer token
pub const TOKEN_KEY: &str = "token";

/// Durable entry holding the JSON-serialized profile
pub const USER_KEY: &str = "user";

/// Profile of the logged-in user. Keys beyond `name` and `email` are kept
/// as-is in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Current authentication state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    /// True iff a token is present. Validity is the backend's concern.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Error)]
enum HydrateError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("malformed user entry: {0}")]
    MalformedUser(#[from] serde_json::Error),

    #[error("user entry present without a token")]
    OrphanUser,
}

/// Observable, durable session store
pub struct SessionStore {
    state: watch::Sender<Session>,
    storage: Arc<dyn KeyValueStore>,
    /// Write lock; the value counts mutations since startup
    generation: Mutex<u64>,
}

impl SessionStore {
    /// Build the store from whatever durable storage holds.
    ///
    /// Corrupt or inconsistent persisted state yields an empty session and
    /// both durable entries are removed.
    pub fn hydrate(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = match load_session(storage.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring persisted session: {}", e);
                for key in [TOKEN_KEY, USER_KEY] {
                    if let Err(e) = storage.remove(key) {
                        tracing::warn!("Failed to remove stale {} entry: {}", key, e);
                    }
                }
                Session::default()
            }
        };

        tracing::debug!(authenticated = session.is_authenticated(), "Session hydrated");

        Self {
            state: watch::Sender::new(session),
            storage,
            generation: Mutex::new(0),
        }
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Observe session changes
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Number of mutations applied since startup
    pub fn generation(&self) -> u64 {
        *self.lock()
    }

    /// Replace token and user together
    pub fn set_session(&self, token: String, user: UserProfile) -> Result<(), StorageError> {
        let mut generation = self.lock();
        *generation += 1;

        let user_json = serde_json::to_string(&user)?;
        self.state.send_replace(Session {
            token: Some(token.clone()),
            user: Some(user),
        });

        // Drop the old profile first so a partial write never pairs the new
        // token with the previous user
        self.storage.remove(USER_KEY)?;
        self.storage.set(TOKEN_KEY, &token)?;
        self.storage.set(USER_KEY, &user_json)
    }

    /// Replace only the token, keeping the profile
    pub fn set_token(&self, token: String) -> Result<(), StorageError> {
        let mut generation = self.lock();
        self.apply_token(&mut generation, token)
    }

    /// Replace the token only if no other mutation happened since
    /// `expected` was read. Returns whether the token was applied.
    pub fn set_token_if(&self, expected: u64, token: String) -> Result<bool, StorageError> {
        let mut generation = self.lock();
        if *generation != expected {
            return Ok(false);
        }
        self.apply_token(&mut generation, token)?;
        Ok(true)
    }

    /// Replace or drop the profile, keeping the token
    pub fn set_user(&self, user: Option<UserProfile>) -> Result<(), StorageError> {
        let mut generation = self.lock();
        *generation += 1;

        let user_json = user.as_ref().map(serde_json::to_string).transpose()?;
        self.state.send_modify(|session| session.user = user);

        match user_json {
            Some(json) => self.storage.set(USER_KEY, &json),
            None => self.storage.remove(USER_KEY),
        }
    }

    /// Forget token and user, in memory and on disk
    pub fn clear_session(&self) -> Result<(), StorageError> {
        let mut generation = self.lock();
        self.apply_clear(&mut generation)
    }

    /// Clear only if no other mutation happened since `expected` was read.
    /// Returns whether the session was cleared.
    pub fn clear_session_if(&self, expected: u64) -> Result<bool, StorageError> {
        let mut generation = self.lock();
        if *generation != expected {
            return Ok(false);
        }
        self.apply_clear(&mut generation)?;
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_token(&self, generation: &mut u64, token: String) -> Result<(), StorageError> {
        *generation += 1;
        self.state
            .send_modify(|session| session.token = Some(token.clone()));
        self.storage.set(TOKEN_KEY, &token)
    }

    fn apply_clear(&self, generation: &mut u64) -> Result<(), StorageError> {
        *generation += 1;
        self.state.send_replace(Session::default());

        // Attempt both removals even if the first one fails
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}

fn load_session(storage: &dyn KeyValueStore) -> Result<Session, HydrateError> {
    let token = storage.get(TOKEN_KEY)?;
    let user = storage
        .get(USER_KEY)?
        .map(|raw| serde_json::from_str::<UserProfile>(&raw))
        .transpose()?;

    if user.is_some() && token.is_none() {
        return Err(HydrateError::OrphanUser);
    }

    Ok(Session { token, user })
}
