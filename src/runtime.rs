//! Runtime for executing chat sessions
//!
//! Sessions live in memory only, keyed by the id the browser carries in its
//! cookie. Each session is guarded by its own async mutex held for a whole
//! submit cycle, so one session never sees two submissions interleave while
//! different sessions proceed independently.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{DispatchOutcome, SessionRuntime};
pub use traits::*;

use crate::state_machine::{ChatContext, Event, Session, TransitionError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Sessions unseen for this long are dropped
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

/// Runtime type used by the server: the model is chosen at startup
pub type SharedRuntime = SessionRuntime<Arc<dyn ModelClient>>;

/// Handle to one session's state
#[derive(Clone)]
pub struct SessionHandle {
    pub id: String,
    pub session: Arc<Mutex<Session>>,
    /// True when this lookup created the session
    pub created: bool,
}

struct SessionEntry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// Manager for all live sessions
pub struct SessionManager {
    runtime: Arc<SharedRuntime>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(context: ChatContext, model: Arc<dyn ModelClient>) -> Self {
        Self {
            runtime: Arc::new(SessionRuntime::new(context, model)),
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: DEFAULT_SESSION_IDLE,
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn context(&self) -> &ChatContext {
        self.runtime.context()
    }

    pub fn model_id(&self) -> &str {
        self.runtime.model_id()
    }

    /// Look up a session, creating it if the id is missing or unknown.
    /// Either way the session counts as seen now.
    pub async fn get_or_create(&self, id: Option<&str>) -> SessionHandle {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                entry.last_seen = now;
                return SessionHandle {
                    id: id.to_string(),
                    session: entry.session.clone(),
                    created: false,
                };
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(Session::new(self.context())));
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: session.clone(),
                last_seen: now,
            },
        );
        tracing::info!(session_id = %id, sessions = sessions.len(), "Session created");

        SessionHandle {
            id,
            session,
            created: true,
        }
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle longer than the timeout as of `now`.
    ///
    /// A session whose lock is held is in use and stays regardless of age.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let idle_timeout = self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, entry| {
            now.saturating_duration_since(entry.last_seen) < idle_timeout
                || entry.session.try_lock().is_err()
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, sessions = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Periodically evict idle sessions for as long as the task runs
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let period = (self.idle_timeout / 4).max(Duration::from_millis(10));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                manager.evict_idle(Instant::now()).await;
            }
        })
    }

    /// Run an event to completion for one session
    pub async fn dispatch(
        &self,
        handle: &SessionHandle,
        event: Event,
    ) -> Result<DispatchOutcome, TransitionError> {
        self.dispatch_all(handle, vec![event]).await
    }

    /// Bind the posted input value, then submit it
    pub async fn stage_and_submit(
        &self,
        handle: &SessionHandle,
        text: String,
    ) -> Result<DispatchOutcome, TransitionError> {
        let events = vec![Event::stage_draft(text.clone()), Event::submit(text)];
        self.dispatch_all(handle, events).await
    }

    /// Run events in order under a single hold of the session lock.
    ///
    /// The batch runs on its own task, so a client that disconnects while the
    /// model is thinking cannot leave the session stuck mid-submission or
    /// half-way through the batch.
    async fn dispatch_all(
        &self,
        handle: &SessionHandle,
        events: Vec<Event>,
    ) -> Result<DispatchOutcome, TransitionError> {
        let runtime = self.runtime.clone();
        let session = handle.session.clone();
        let session_id = handle.id.clone();

        let task = tokio::spawn(async move {
            let mut guard = session.lock().await;
            let mut outcome = DispatchOutcome::default();
            for event in events {
                outcome.merge(runtime.dispatch(&session_id, &mut guard, event).await?);
            }
            tracing::debug!(
                session_id = %session_id,
                model_calls = outcome.model_calls,
                rerender = outcome.rerender,
                "Dispatch finished"
            );
            Ok::<_, TransitionError>(outcome)
        });

        task.await.map_err(|e| {
            tracing::error!(session_id = %handle.id, error = %e, "Session task failed");
            TransitionError::InvalidTransition(format!("session task failed: {e}"))
        })?
    }
}
