//! Session storage.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::ConversationEngine;
use crate::research::{Screen, ScreenBinding};

/// Inactivity after which a session may be dropped.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A single conversation session.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Unique session identifier.
    id: String,
    /// Screen the conversation was started on.
    screen: Screen,
    /// The conversation itself.
    engine: ConversationEngine,
    /// Session creation time.
    created_at: DateTime<Utc>,
    /// Last time the session was used.
    last_activity: RwLock<DateTime<Utc>>,
}

impl Session {
    fn new(id: String, binding: &ScreenBinding) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(SessionInner {
                id,
                screen: binding.screen,
                engine: ConversationEngine::for_screen(binding),
                created_at: now,
                last_activity: RwLock::new(now),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.inner.screen
    }

    #[must_use]
    pub fn engine(&self) -> &ConversationEngine {
        &self.inner.engine
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Number of turns so far.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.inner.engine.snapshot().turns().len()
    }

    /// Update the last activity timestamp.
    pub fn touch(&self) {
        *self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if the session has been idle for at least `timeout`.
    ///
    /// A session with a request in flight never expires.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        if self.inner.engine.snapshot().is_loading() {
            return false;
        }
        // Negative means clock skew; treat as fresh.
        (Utc::now() - self.last_activity())
            .to_std()
            .is_ok_and(|idle| idle >= timeout)
    }

    #[cfg(test)]
    fn backdate(&self, by: chrono::Duration) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard -= by;
    }
}

/// Thread-safe store for sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, Session>>,
    /// Idle time after which sessions are dropped.
    timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    /// Create a store that drops sessions idle for `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
                timeout,
            }),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Start a new conversation on the bound screen.
    ///
    /// Expired sessions are swept first.
    #[must_use]
    pub fn create(&self, binding: &ScreenBinding) -> Session {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), binding);
        let mut guard = self
            .inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let timeout = self.inner.timeout;
        guard.retain(|_, s| !s.is_expired_with_timeout(timeout));
        guard.insert(id, session.clone());
        session
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        let guard = self
            .inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.get(id).cloned()
    }

    /// Remove a session by ID.
    pub fn remove(&self, id: &str) -> Option<Session> {
        let mut guard = self
            .inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.remove(id)
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all expired sessions.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(self.inner.timeout)
    }

    /// Remove sessions that have been inactive longer than the timeout.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self
            .inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    /// All sessions, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        sessions.sort_by_key(Session::created_at);
        sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::{MemoProjection, ResearchBackend};
    use serde_json::Value;

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait::async_trait]
    impl ResearchBackend for Unreachable {
        async fn query(&self, _prompt: &str) -> crate::error::Result<Value> {
            Err(crate::error::Error::Status { status: 503 })
        }
    }

    fn binding() -> ScreenBinding {
        ScreenBinding {
            screen: Screen::Research,
            backend: Arc::new(Unreachable),
            projection: Arc::new(MemoProjection),
        }
    }

    #[test]
    fn test_session_store() {
        let store = SessionStore::new();

        assert!(store.is_empty());

        let session = store.create(&binding());
        assert_eq!(store.len(), 1);
        assert_eq!(session.screen(), Screen::Research);
        assert_eq!(session.turn_count(), 0);

        let retrieved = store.get(session.id()).unwrap();
        assert_eq!(retrieved.id(), session.id());

        store.remove(session.id());
        assert!(store.is_empty());
    }

    #[test]
    fn test_sessions_do_not_share_state() {
        let store = SessionStore::new();
        let a = store.create(&binding());
        let b = store.create(&binding());

        a.engine().toggle_sources();
        assert!(a.engine().snapshot().sources_panel_open());
        assert!(!b.engine().snapshot().sources_panel_open());
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_expired_session_is_removed() {
        let store = SessionStore::new();
        let stale = store.create(&binding());
        let fresh = store.create(&binding());

        stale.backdate(chrono::Duration::hours(1));
        assert!(stale.is_expired_with_timeout(DEFAULT_SESSION_TIMEOUT));
        assert!(!fresh.is_expired_with_timeout(DEFAULT_SESSION_TIMEOUT));

        assert_eq!(store.cleanup_expired(), 1);
        assert!(store.get(stale.id()).is_none());
        assert!(store.get(fresh.id()).is_some());
    }

    #[test]
    fn test_touch_keeps_session_alive() {
        let store = SessionStore::new();
        let session = store.create(&binding());

        session.backdate(chrono::Duration::hours(1));
        session.touch();
        assert_eq!(store.cleanup_expired(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_sweeps_expired_sessions() {
        let store = SessionStore::new();
        for _ in 0..10 {
            store.create(&binding()).backdate(chrono::Duration::hours(1));
        }
        assert_eq!(store.len(), 10);

        let session = store.create(&binding());
        assert_eq!(store.len(), 1);
        assert!(store.get(session.id()).is_some());
    }

    #[test]
    fn test_loading_session_never_expires() {
        let store = SessionStore::with_timeout(Duration::ZERO);
        let session = store.create(&binding());
        session
            .engine()
            .store()
            .begin_submission("in flight")
            .unwrap();

        assert_eq!(store.cleanup_expired(), 0);
        assert_eq!(store.timeout(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_session_engine_is_shared_between_handles() {
        let store = SessionStore::new();
        let session = store.create(&binding());

        session.engine().submit("question").await.unwrap();
        assert_eq!(store.get(session.id()).unwrap().turn_count(), 2);
    }
}
