//! Runtime for executing wizard sessions
//!
//! Each session is an isolated [`WizardRuntime`] behind its own async mutex,
//! so requests for one session are handled one at a time and sessions never
//! see each other.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::WizardRuntime;

use crate::config::DEFAULT_SESSION_IDLE_MINUTES;
use crate::llm::LlmService;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// How often the background sweep looks for idle sessions
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared handle to one session's runtime
pub type SessionHandle = Arc<Mutex<WizardRuntime>>;

/// Manager for all live sessions
pub struct SessionManager {
    llm_client: Arc<dyn LlmService>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
    idle_timeout: TimeDelta,
}

impl SessionManager {
    pub fn new(llm_client: Arc<dyn LlmService>) -> Self {
        Self {
            llm_client,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: TimeDelta::minutes(i64::from(DEFAULT_SESSION_IDLE_MINUTES)),
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: TimeDelta) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Start the background task that evicts idle sessions.
    ///
    /// Holds only a weak reference, so the task ends once the manager is dropped.
    pub fn start_idle_sweeper(self: &Arc<Self>) {
        let manager_weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(SWEEP_INTERVAL).await;
                let Some(manager) = manager_weak.upgrade() else {
                    tracing::debug!("SessionManager dropped, idle sweeper exiting");
                    break;
                };
                manager.evict_idle().await;
            }
        });
    }

    /// Create a new Idle session
    pub async fn create(&self) -> (String, SessionHandle) {
        let id = uuid::Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(WizardRuntime::new(
            id.clone(),
            self.llm_client.clone(),
        )));

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), handle.clone());
        tracing::info!(session_id = %id, active_sessions = sessions.len(), "Session created");
        drop(sessions);

        (id, handle)
    }

    /// Look up a live session. An idle one found here is expired on the spot
    /// rather than waiting for the next sweep.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        let handle = self.sessions.read().await.get(id).cloned()?;
        if self.is_idle(&handle, Utc::now()) {
            self.sessions.write().await.remove(id);
            tracing::info!(session_id = %id, "Session expired");
            return None;
        }
        Some(handle)
    }

    /// Drop a session; returns false if it did not exist
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Remove every session idle past the timeout; returns how many went
    pub async fn evict_idle(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, handle| {
            let idle = self.is_idle(handle, now);
            if idle {
                tracing::info!(session_id = %id, "Session expired");
            }
            !idle
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, active_sessions = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    /// A session whose lock is held is in use and never idle
    fn is_idle(&self, handle: &SessionHandle, now: DateTime<Utc>) -> bool {
        handle
            .try_lock()
            .is_ok_and(|runtime| now - runtime.updated_at() >= self.idle_timeout)
    }
}
