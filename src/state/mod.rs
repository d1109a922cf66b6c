//! Shared application state: the storage handle, degraded flag, and admin sessions.

pub mod scoreboard;

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::scoreboard_store::ScoreboardStore, error::ServiceError};

/// Cheaply clonable handle to the process-wide [`AppState`].
pub type SharedState = Arc<AppState>;

/// How long an admin session stays valid after login.
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Opaque token identifying one logged-in admin browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    fn issue() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token from its cookie representation.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Bookkeeping for one live session.
struct SessionEntry {
    issued_at: Instant,
}

impl SessionEntry {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.issued_at) >= SESSION_TTL
    }
}

/// Central application state shared by every request handler.
pub struct AppState {
    config: AppConfig,
    store: RwLock<Option<Arc<dyn ScoreboardStore>>>,
    degraded: watch::Sender<bool>,
    sessions: DashMap<Uuid, SessionEntry>,
}

impl AppState {
    /// Construct the shared state wrapped in an [`Arc`].
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            store: RwLock::new(None),
            degraded,
            sessions: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the current storage backend, if one is installed.
    pub async fn scoreboard_store(&self) -> Option<Arc<dyn ScoreboardStore>> {
        self.store.read().await.as_ref().cloned()
    }

    /// Storage backend for write paths, or a degraded-mode error.
    pub async fn require_store(&self) -> Result<Arc<dyn ScoreboardStore>, ServiceError> {
        self.scoreboard_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn ScoreboardStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Drop the storage backend and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded flag changes.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Flip the degraded flag; called by the storage supervisor.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_replace(value);
    }

    /// Open a session for the admin and return its token.
    pub fn open_session(&self) -> SessionToken {
        let token = SessionToken::issue();
        self.sessions.insert(
            token.0,
            SessionEntry {
                issued_at: Instant::now(),
            },
        );
        token
    }

    /// Remove a session regardless of its age.
    pub fn close_session(&self, token: &SessionToken) {
        self.sessions.remove(&token.0);
    }

    /// Whether the token belongs to a live, unexpired session.
    ///
    /// Expired entries are removed on sight rather than by a sweeper task.
    pub fn session_active(&self, token: &SessionToken) -> bool {
        let now = Instant::now();
        match self.sessions.get(&token.0) {
            Some(entry) if !entry.expired(now) => true,
            Some(entry) => {
                // Release the shard guard before removing.
                drop(entry);
                self.sessions.remove(&token.0);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_open_check_and_close() {
        let state = AppState::new(AppConfig::default());
        let token = state.open_session();
        assert!(state.session_active(&token));
        state.close_session(&token);
        assert!(!state.session_active(&token));
    }

    #[test]
    fn unknown_tokens_are_inactive() {
        let state = AppState::new(AppConfig::default());
        let foreign = SessionToken::issue();
        assert!(!state.session_active(&foreign));
    }

    #[test]
    fn entries_expire_after_the_ttl() {
        let now = Instant::now();
        let fresh = SessionEntry { issued_at: now };
        assert!(!fresh.expired(now));
        assert!(fresh.expired(now + SESSION_TTL));
    }

    #[test]
    fn tokens_round_trip_through_strings() {
        let token = SessionToken::issue();
        assert_eq!(SessionToken::parse(&token.to_string()), Some(token));
        assert_eq!(SessionToken::parse("not-a-uuid"), None);
    }
}
