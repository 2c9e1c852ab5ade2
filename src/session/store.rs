//! Session handles and the in-memory session store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::responder::ResponseGenerator;

use super::events::{UiEvent, transition};
use super::state::{MessageRole, SessionState};

/// Default idle timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// A single visitor session.
///
/// Cloning is cheap: clones share the same state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    state: RwLock<SessionState>,
    created_at: DateTime<Utc>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Session {
    /// Create a seeded session with the given ID.
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(SessionInner {
                id,
                state: RwLock::new(SessionState::seeded()),
                created_at: now,
                last_activity: RwLock::new(now),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        read(&self.inner.state).clone()
    }

    /// Apply a UI event. On error the state is left as it was.
    pub fn dispatch(&self, event: UiEvent) -> Result<(), AppError> {
        let name = event.name();
        let mut guard = write(&self.inner.state);
        let next = transition(guard.clone(), event)?;
        *guard = next;
        drop(guard);
        self.touch();
        tracing::debug!(session_id = %self.id(), event = name, "Event applied");
        Ok(())
    }

    /// Answer the last message if the assistant has not spoken last.
    ///
    /// The lock is released while the generator runs. If another turn changed
    /// the transcript meanwhile, the answer is dropped and `Ok(false)` is
    /// returned.
    pub async fn respond_if_needed(
        &self,
        generator: &dyn ResponseGenerator,
    ) -> Result<bool, AppError> {
        let (prompt, expected_len) = {
            let guard = read(&self.inner.state);
            match guard.pending_prompt() {
                Some(prompt) => (prompt.to_owned(), guard.messages().len()),
                None => return Ok(false),
            }
        };

        let answer = generator.generate(&prompt).await?;

        let mut guard = write(&self.inner.state);
        if guard.messages().len() != expected_len || guard.pending_prompt() != Some(prompt.as_str())
        {
            tracing::warn!(session_id = %self.id(), "Transcript changed while generating, answer dropped");
            return Ok(false);
        }
        guard.append_message(answer, MessageRole::Assistant);
        drop(guard);
        self.touch();
        Ok(true)
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        read(&self.inner.state).messages().len()
    }

    /// Update the last activity timestamp.
    pub fn touch(&self) {
        *write(&self.inner.last_activity) = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *read(&self.inner.last_activity);
        // A negative span means the clock moved backwards.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    /// Time since the session was created.
    #[must_use]
    pub fn age(&self) -> Duration {
        (Utc::now() - self.inner.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
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
    timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store with the default idle timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    /// Create a store that sweeps sessions idle longer than `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
                timeout,
            }),
        }
    }

    /// Create a new seeded session, sweeping idle ones first.
    #[must_use]
    pub fn create(&self) -> Session {
        let removed = self.cleanup_expired();
        if removed > 0 {
            tracing::info!(removed, "Expired sessions removed");
        }
        self.create_with_id(Uuid::new_v4().to_string())
    }

    /// Create a new seeded session with a specific ID.
    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> Session {
        let id = id.into();
        let session = Session::new(id.clone());
        write(&self.inner.sessions).insert(id, session.clone());
        tracing::info!(name: "session.created", session_id = %session.id(), "Session created");
        session
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        read(&self.inner.sessions).get(id).cloned()
    }

    /// Look up a session, creating a seeded one if the ID is unknown.
    ///
    /// Creating sweeps idle sessions first, as [`SessionStore::create`] does.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Session {
        if let Some(session) = self.get(id) {
            session.touch();
            return session;
        }
        let removed = self.cleanup_expired();
        if removed > 0 {
            tracing::info!(removed, "Expired sessions removed");
        }
        let mut guard = write(&self.inner.sessions);
        guard
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::info!(name: "session.created", session_id = %id, "Session created");
                Session::new(id.to_string())
            })
            .clone()
    }

    pub fn remove(&self, id: &str) -> Option<Session> {
        write(&self.inner.sessions).remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.inner.sessions).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle longer than the store timeout.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(self.inner.timeout)
    }

    /// Remove sessions idle longer than `timeout`. Returns how many were removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = write(&self.inner.sessions);
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        read(&self.inner.sessions).keys().cloned().collect()
    }
}
