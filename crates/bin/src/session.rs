//! Session management for web interface
//!
//! In-memory session storage mapping session tokens to the logged-in username.
//! Sessions are ephemeral and lost on server restart.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Longest session lifetime; larger values are clamped to it
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(366 * 24 * 3600);

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

#[derive(Debug, Clone)]
struct Session {
    username: String,
    expires_at: Instant,
}

/// In-memory session store
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store whose sessions live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: ttl.min(MAX_SESSION_TTL),
        }
    }

    /// Create a new session for a user
    ///
    /// Returns the random token to be stored in a cookie.
    pub async fn create_session(&self, username: &str) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            username: username.to_string(),
            expires_at: Instant::now() + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > Instant::now());
        sessions.insert(token.clone(), session);
        token
    }

    /// Username of a live session, or `None` if the token is unknown or expired
    pub async fn get_user(&self, token: &str) -> Option<String> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(s) if s.expires_at > Instant::now() => return Some(s.username.clone()),
                Some(_) => {}
            }
        }

        tracing::debug!("Session expired");
        self.destroy_session(token).await;
        None
    }

    /// Destroy a session
    pub async fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Get the number of stored sessions
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
