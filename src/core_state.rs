//! HB-06: Shared application state.
//!
//! `CoreState` is the single state managed by Tauri and shared by every
//! command handler. Uses `RwLock` so catalog reads and session
//! snapshots run concurrently while workflow transitions take the
//! write path.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use uuid::Uuid;

use crate::catalog::store::CatalogStore;
use crate::workflow::session::WorkflowSession;
use crate::workflow::types::SessionSnapshot;

/// Cap on retained sessions. Terminal sessions are pruned when the
/// map reaches this size; it only exceeds the cap while that many
/// runs are actually live.
const MAX_SESSIONS: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("No session with id {0}")]
    SessionNotFound(Uuid),
}

/// Application state shared across the IPC surface.
///
/// Wrapped in `Arc` at startup. The catalog store and the session map
/// sit behind independent locks: a catalog refresh never stalls a
/// running workflow.
pub struct CoreState {
    /// Cached areas and licenses.
    catalog: CatalogStore,
    /// Live and recently finished workflow sessions, keyed by id.
    sessions: RwLock<HashMap<Uuid, WorkflowSession>>,
    /// Last command activity, reported by `backend_status`.
    last_activity: Mutex<Instant>,
}

impl CoreState {
    pub fn new() -> Self {
        Self::with_catalog(CatalogStore::new())
    }

    /// Builds state around a specific catalog store. Tests pair this
    /// with `CatalogStore::empty()`.
    pub fn with_catalog(catalog: CatalogStore) -> Self {
        Self {
            catalog,
            sessions: RwLock::new(HashMap::new()),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    // ── Session access ────────────────────────────

    pub fn read_sessions(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<Uuid, WorkflowSession>>, CoreError> {
        self.sessions.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_sessions(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, WorkflowSession>>, CoreError> {
        self.sessions.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Register a fresh session and return its id. Prunes finished
    /// sessions once the map is at capacity.
    pub fn insert_session(&self, session: WorkflowSession) -> Result<Uuid, CoreError> {
        let id = session.id;
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;

        if sessions.len() >= MAX_SESSIONS {
            let before = sessions.len();
            sessions.retain(|_, s| !s.phase().is_terminal());
            tracing::debug!(pruned = before - sessions.len(), "Pruned finished sessions");
        }

        sessions.insert(id, session);
        Ok(id)
    }

    /// Snapshot one session for the frontend.
    pub fn session_snapshot(&self, id: &Uuid) -> Result<SessionSnapshot, CoreError> {
        let sessions = self.sessions.read().map_err(|_| CoreError::LockPoisoned)?;
        sessions
            .get(id)
            .map(|s| s.snapshot())
            .ok_or(CoreError::SessionNotFound(*id))
    }

    /// Drop a session, returning its final snapshot.
    pub fn remove_session(&self, id: &Uuid) -> Result<SessionSnapshot, CoreError> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        sessions
            .remove(id)
            .map(|s| s.snapshot())
            .ok_or(CoreError::SessionNotFound(*id))
    }

    /// Run a closure against one session under the write lock. This is
    /// how command handlers apply transitions.
    pub fn with_session_mut<T>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut WorkflowSession) -> T,
    ) -> Result<T, CoreError> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        let session = sessions
            .get_mut(id)
            .ok_or(CoreError::SessionNotFound(*id))?;
        Ok(f(session))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    // ── Activity tracking ────────────────────────────

    pub fn update_activity(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    /// Seconds since the last command touched the state.
    pub fn idle_secs(&self) -> u64 {
        self.last_activity
            .lock()
            .map(|last| last.elapsed().as_secs())
            .unwrap_or(0)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}
