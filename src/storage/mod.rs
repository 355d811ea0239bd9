//! Session storage.
//!
//! A session holds a normalized dataset so that repeated queries do not pay
//! normalization again. Sessions are identified by opaque ids and expire
//! after a configurable idle period.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Dataset;

/// Opaque identifier for a stored session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Storage for normalized-dataset sessions.
pub trait SessionStore: Send + Sync {
    /// Stores a dataset and returns its session id.
    fn put(&self, dataset: Dataset) -> SessionId;

    /// Fetches a session's dataset, refreshing its idle timer.
    fn get(&self, id: &SessionId) -> Option<Arc<Dataset>>;

    /// Removes a session. Returns true if it existed.
    fn remove(&self, id: &SessionId) -> bool;
}

struct Session {
    dataset: Arc<Dataset>,
    touched_at: Instant,
}

/// In-memory session store with idle expiry.
///
/// Expired sessions are dropped lazily: a full sweep runs on every `put`,
/// and `get` checks the single session it touches. With `ttl` of `None`,
/// sessions live until removed.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    /// Creates a store whose sessions expire after `ttl` of inactivity.
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().map_or(0, |s| s.len())
    }

    /// Returns true when no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expired(&self, session: &Session) -> bool {
        self.ttl
            .is_some_and(|ttl| session.touched_at.elapsed() >= ttl)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(3600)))
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, dataset: Dataset) -> SessionId {
        let id = SessionId::generate();
        let Ok(mut sessions) = self.sessions.lock() else {
            return id;
        };
        sessions.retain(|_, s| !self.expired(s));
        sessions.insert(
            id.clone(),
            Session {
                dataset: Arc::new(dataset),
                touched_at: Instant::now(),
            },
        );
        id
    }

    fn get(&self, id: &SessionId) -> Option<Arc<Dataset>> {
        let mut sessions = self.sessions.lock().ok()?;
        if sessions.get(id).is_some_and(|s| self.expired(s)) {
            sessions.remove(id);
            return None;
        }
        let session = sessions.get_mut(id)?;
        session.touched_at = Instant::now();
        Some(Arc::clone(&session.dataset))
    }

    fn remove(&self, id: &SessionId) -> bool {
        self.sessions
            .lock()
            .is_ok_and(|mut s| s.remove(id).is_some())
    }
}
