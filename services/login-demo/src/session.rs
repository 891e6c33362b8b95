//! Browser sessions keyed by a cookie
//!
//! Each browser gets a random session id in the `li_session` cookie. The
//! session holds the login state store and, after a successful callback,
//! the user's access token. Everything lives in memory and is lost on
//! restart. Sessions idle for longer than the TTL are dropped, and the
//! registry never holds more than its capacity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use linkedin_auth::{AccessToken, MemorySession};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "li_session";

/// One browser's login state.
#[derive(Debug, Default)]
pub struct UserSession {
    pub store: MemorySession,
    pub token: Option<AccessToken>,
}

struct Entry {
    session: Arc<Mutex<UserSession>>,
    last_seen: Instant,
}

/// All live sessions. Cloning shares the same map.
///
/// The map lock is held only to look up or insert an entry; each session
/// has its own lock, which callback handling holds across the token
/// exchange so one browser cannot run two exchanges at once.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    /// Live session for `id`. Refreshes its idle timer.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<UserSession>>> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id)?;
        if entry.last_seen.elapsed() >= self.idle_ttl {
            sessions.remove(&id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Existing session for `id`, or a new one under a fresh id.
    ///
    /// Creating a session first drops expired entries, then evicts the
    /// least recently seen ones until there is room.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<Mutex<UserSession>>) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                if now.duration_since(entry.last_seen) < self.idle_ttl {
                    entry.last_seen = now;
                    return (id, Arc::clone(&entry.session));
                }
            }
        }

        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            debug!(session = %oldest, "evicted least recently used session");
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(UserSession::default()));
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        (id, session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Session id from the request's Cookie header, if well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// `Set-Cookie` value for a session id. `secure` adds the `Secure`
/// attribute, for deployments served over https.
pub fn session_cookie(id: Uuid, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax{secure}")
}
