/// Workflow state machine driving the selection/guess/gift steps.
pub mod workflow;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::selection_store::SelectionStore, error::ServiceError};

pub use self::workflow::{Snapshot, Workflow, WorkflowStep};

/// Cheaply cloneable handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Upper bound on a single awaited store call during a workflow transition.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);

/// One participant's workflow plus the bookkeeping the session reaper needs.
pub struct WorkflowSession {
    /// The session's workflow state machine.
    pub workflow: Workflow,
    /// Last time a handler touched this session.
    pub touched_at: Instant,
}

impl WorkflowSession {
    fn new() -> Self {
        Self {
            workflow: Workflow::new(),
            touched_at: Instant::now(),
        }
    }

    /// Record activity so the reaper keeps this session alive.
    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }
}

/// Central application state storing the roster configuration, workflow
/// sessions, and the storage handle.
pub struct AppState {
    config: AppConfig,
    selection_store: RwLock<Option<Arc<dyn SelectionStore>>>,
    sessions: DashMap<Uuid, Arc<Mutex<WorkflowSession>>>,
    degraded: watch::Sender<bool>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            selection_store: RwLock::new(None),
            sessions: DashMap::new(),
            degraded: degraded_tx,
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
        })
    }

    /// Immutable roster and gift-option configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current selection store, if one is installed.
    pub async fn selection_store(&self) -> Option<Arc<dyn SelectionStore>> {
        let guard = self.selection_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the selection store or fail with the degraded-mode error.
    pub async fn require_selection_store(&self) -> Result<Arc<dyn SelectionStore>, ServiceError> {
        self.selection_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_selection_store(&self, store: Arc<dyn SelectionStore>) {
        {
            let mut guard = self.selection_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        if self.is_degraded() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Create a fresh workflow session and return its id with the initial snapshot.
    pub fn create_session(&self) -> (Uuid, Snapshot) {
        let id = Uuid::new_v4();
        let session = WorkflowSession::new();
        let snapshot = session.workflow.snapshot();
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        (id, snapshot)
    }

    /// Look up a workflow session by id.
    pub fn session(&self, id: Uuid) -> Option<Arc<Mutex<WorkflowSession>>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of live workflow sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for longer than `ttl`, returning how many were removed.
    pub fn remove_idle_sessions(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let candidates: Vec<(Uuid, Arc<Mutex<WorkflowSession>>)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut removed = 0;
        for (id, session) in candidates {
            // A locked session has a submit in flight and is not idle.
            let Ok(guard) = session.try_lock() else {
                continue;
            };
            if now.duration_since(guard.touched_at) > ttl {
                // Remove while still holding the guard so a handler waiting on
                // this session cannot slip in between eviction steps.
                self.sessions.remove(&id);
                removed += 1;
            }
        }

        removed
    }

    /// Upper bound applied to awaited store calls inside a transition.
    pub fn transition_timeout(&self) -> Option<Duration> {
        self.transition_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKDATE: Duration = Duration::from_secs(2);

    async fn backdate(state: &SharedState, id: Uuid) {
        let session = state.session(id).unwrap();
        session.lock().await.touched_at = Instant::now() - BACKDATE;
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_after_their_ttl() {
        let state = AppState::new(AppConfig::default());
        let (stale_id, _) = state.create_session();
        let (fresh_id, _) = state.create_session();
        backdate(&state, stale_id).await;

        let removed = state.remove_idle_sessions(Duration::from_secs(1));

        assert_eq!(removed, 1);
        assert_eq!(state.session_count(), 1);
        assert!(state.session(stale_id).is_none());
        assert!(state.session(fresh_id).is_some());
    }

    #[tokio::test]
    async fn sessions_with_a_submit_in_flight_survive_the_reaper() {
        let state = AppState::new(AppConfig::default());
        let (busy_id, _) = state.create_session();
        let (idle_id, _) = state.create_session();
        backdate(&state, busy_id).await;
        backdate(&state, idle_id).await;

        // Holding the session lock is what a submit in flight looks like.
        let busy = state.session(busy_id).unwrap();
        let guard = busy.lock().await;

        let removed = state.remove_idle_sessions(Duration::ZERO);

        assert_eq!(removed, 1);
        assert_eq!(state.session_count(), 1);
        assert!(state.session(busy_id).is_some());
        assert!(state.session(idle_id).is_none());
        drop(guard);

        // Once the submit finishes the session is fair game again.
        assert_eq!(state.remove_idle_sessions(Duration::ZERO), 1);
        assert_eq!(state.session_count(), 0);
    }
}
