//! Registry of live sessions, one per open panel.
//!
//! Owned by the host integration layer. Panels call [`SessionRegistry::create`]
//! when they open and [`SessionRegistry::dispose`] when they close; the
//! session's log is discarded with it.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use parley_types::chat::SessionInfo;
use parley_types::config::BusyPolicy;
use parley_types::error::SessionError;

use crate::llm::source::ProviderSource;

use super::handle::SessionHandle;
use super::session::ChatSession;

/// Concurrent map from session id to [`SessionHandle`].
///
/// Sessions share nothing but the provider source; each has its own log.
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionHandle>,
    source: Arc<dyn ProviderSource>,
    policy: BusyPolicy,
}

impl SessionRegistry {
    pub fn new(source: Arc<dyn ProviderSource>, policy: BusyPolicy) -> Self {
        Self {
            sessions: DashMap::new(),
            source,
            policy,
        }
    }

    /// Start a new session with an empty log.
    pub fn create(&self) -> SessionHandle {
        let session = ChatSession::new(self.source.clone());
        let handle = SessionHandle::new(session, self.policy);
        self.sessions.insert(handle.id(), handle.clone());
        info!(session_id = %handle.id(), policy = %self.policy, "Session created");
        handle
    }

    /// Look up a live session.
    pub fn get(&self, id: &Uuid) -> Result<SessionHandle, SessionError> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(SessionError::NotFound)
    }

    /// Drop a session. An in-flight question on a cloned handle still
    /// completes, but its result is no longer reachable through the registry.
    pub fn dispose(&self, id: &Uuid) -> Result<(), SessionError> {
        match self.sessions.remove(id) {
            Some((_, handle)) => {
                info!(
                    session_id = %id,
                    turn_count = handle.info().turn_count,
                    "Session disposed"
                );
                Ok(())
            }
            None => Err(SessionError::NotFound),
        }
    }

    /// Summaries of all live sessions, oldest first.
    pub fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<SessionInfo> = self
            .sessions
            .iter()
            .map(|entry| entry.value().info())
            .collect();
        infos.sort_by_key(|info| info.created_at);
        infos
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
