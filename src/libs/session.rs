use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "console_session";

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// State carried by one browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub last_seen: Instant,
}

impl SessionState {
    fn is_idle(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() >= timeout
    }
}

/// Sessions keyed by the random id stored in the session cookie. A session
/// left idle for longer than the timeout is dropped.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    /// Starts an authenticated session and returns its id. Idle sessions
    /// are swept at the same time.
    pub async fn open_authenticated(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_idle(self.idle_timeout));
        sessions.insert(
            id,
            SessionState {
                authenticated: true,
                last_seen: Instant::now(),
            },
        );
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionState> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| !s.is_idle(self.idle_timeout))
            .cloned()
    }

    /// True when `cookie` names a live, authenticated session. A live
    /// session is kept alive; an idle one is removed.
    pub async fn is_authenticated(&self, cookie: Option<&str>) -> bool {
        let Some(id) = cookie.and_then(|c| Uuid::parse_str(c).ok()) else {
            return false;
        };
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return false;
        };
        if session.is_idle(self.idle_timeout) {
            sessions.remove(&id);
            return false;
        }
        session.last_seen = Instant::now();
        session.authenticated
    }

    pub async fn close(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
