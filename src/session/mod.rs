//! Authentication session shared with the API client.
//!
//! The session is an explicit value behind [`SharedSession`]; the only place it
//! touches persistent storage is a [`SessionStore`].

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::Result, utils::persistence};

/// Signed-in user details returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// Value for the `Authorization` header, if a token is held.
    pub fn bearer(&self) -> Option<String> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}"))
    }

    pub fn clear(&mut self) {
        *self = Session::default();
    }
}

pub type SharedSession = Arc<RwLock<Session>>;

/// Single persisted-storage boundary for the session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Session>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session store persisted as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<Session> {
        Ok(persistence::load_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, session: &Session) -> Result<()> {
        if session.is_authenticated() {
            persistence::save_json(session, &self.path)
        } else {
            persistence::remove_json(&self.path)
        }
    }

    fn clear(&self) -> Result<()> {
        persistence::remove_json(&self.path)
    }
}

/// In-process store, handy for tests and for hosts that keep nothing on disk.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    saved: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            saved: Mutex::new(Some(session)),
        }
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.saved.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session> {
        Ok(self.snapshot().unwrap_or_default())
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Ok(mut guard) = self.saved.lock() {
            *guard = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut guard) = self.saved.lock() {
            *guard = None;
        }
        Ok(())
    }
}

/// Owns the shared session and keeps it in step with its store.
pub struct SessionManager {
    session: SharedSession,
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    /// Restores the last saved session from `store`.
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self> {
        let session = store.load()?;
        tracing::debug!(authenticated = session.is_authenticated(), "session restored");
        Ok(Self {
            session: Arc::new(RwLock::new(session)),
            store,
        })
    }

    pub fn shared(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    pub fn current(&self) -> Session {
        self.session
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn login(&self, token: impl Into<String>, user: Option<SessionUser>) -> Result<()> {
        let snapshot = {
            let mut guard = self
                .session
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.token = Some(token.into());
            guard.user = user;
            guard.signed_in_at = Some(Utc::now());
            guard.clone()
        };
        tracing::info!("session established");
        self.store.save(&snapshot)
    }

    pub fn logout(&self) -> Result<()> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        tracing::info!("session cleared");
        self.store.clear()
    }

    /// Persists whatever the shared session currently holds.
    pub fn save(&self) -> Result<()> {
        self.store.save(&self.current())
    }

    /// Store handle for collaborators that must persist session changes,
    /// such as the API client clearing an expired token.
    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }
}
