//! Session manager for handling multiple browser sessions

use super::store::ChatSession;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A session shared between request handlers.
///
/// The async mutex is held for a whole turn, so a locked session means a
/// remote call is in flight.
pub type SharedSession = Arc<tokio::sync::Mutex<ChatSession>>;

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Keeps every live browser session in memory. Nothing is persisted.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    idle_ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager dropping sessions idle for `idle_ttl`
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Get a session if it exists, refreshing its idle timer
    pub fn get(&self, key: &str) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock();
        let entry = sessions.get_mut(key)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Create a fresh session under a new random key
    pub fn create(&self) -> (String, SharedSession) {
        self.prune_idle();

        let key = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(tokio::sync::Mutex::new(ChatSession::new(&key)));
        self.sessions.lock().insert(
            key.clone(),
            SessionEntry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        debug!("Created session {}", key);
        (key, session)
    }

    /// Look up `key`, creating a new session when it is absent or unknown.
    /// The returned key may differ from the requested one.
    pub fn get_or_create(&self, key: Option<&str>) -> (String, SharedSession) {
        if let Some(key) = key {
            if let Some(session) = self.get(key) {
                return (key.to_string(), session);
            }
        }
        self.create()
    }

    /// Drop a session. Returns true if it existed.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.sessions.lock().remove(key).is_some();
        if removed {
            debug!("Removed session {}", key);
        }
        removed
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle for longer than the configured ttl.
    /// Sessions with a turn in flight are kept.
    pub fn prune_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let idle = now.duration_since(entry.last_seen) <= self.idle_ttl;
            idle || entry.session.try_lock().is_err()
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} idle sessions", pruned);
        }
        pruned
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 3600))
    }
}
