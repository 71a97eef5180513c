//! Connection Registry
//!
//! Tracks live sessions per user identity. A user key exists iff at least one
//! live session exists for it. Adding the first session or removing the last
//! one is an online/offline transition; the add/remove and that decision
//! happen under a single lock, and nothing else (in particular no I/O) runs
//! while the lock is held.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use super::events::Frame;
use super::fanout::Scope;
use super::presence::PresenceStatus;
use super::session::{DeliveryReport, Session};

/// An online/offline edge produced by the registry.
///
/// `epoch` increases strictly with every edge, so consumers can discard an
/// edge that arrives after a newer one for the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub user_id: Uuid,
    pub status: PresenceStatus,
    pub epoch: u64,
}

#[derive(Default)]
struct RegistryState {
    users: HashMap<Uuid, Vec<Arc<Session>>>,
    epoch: u64,
}

impl RegistryState {
    fn edge(&mut self, user_id: Uuid, status: PresenceStatus) -> Transition {
        self.epoch += 1;
        Transition {
            user_id,
            status,
            epoch: self.epoch,
        }
    }
}

/// Process-scoped map of user id to that user's live sessions.
#[derive(Default)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session. Returns the online edge if this is the user's
    /// first live session. Registering the same session twice is a no-op.
    pub fn connect(&self, session: Arc<Session>) -> Option<Transition> {
        let user_id = session.user_id();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let sessions = state.users.entry(user_id).or_default();
        if sessions.iter().any(|s| s.id() == session.id()) {
            return None;
        }
        let first = sessions.is_empty();
        sessions.push(session);

        first.then(|| state.edge(user_id, PresenceStatus::Online))
    }

    /// Remove a session. Returns the offline edge if it was the user's last
    /// one. Idempotent: removing an unknown session returns `None`.
    pub fn disconnect(&self, session_id: Uuid, user_id: Uuid) -> Option<Transition> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let sessions = state.users.get_mut(&user_id)?;
        let before = sessions.len();
        sessions.retain(|s| s.id() != session_id);
        if sessions.len() == before || !sessions.is_empty() {
            return None;
        }

        state.users.remove(&user_id);
        Some(state.edge(user_id, PresenceStatus::Offline))
    }

    /// Check if user is online (has at least one session)
    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.state.lock().users.contains_key(&user_id)
    }

    pub fn online_user_ids(&self) -> Vec<Uuid> {
        self.state.lock().users.keys().copied().collect()
    }

    /// Number of live sessions for one user.
    pub fn sessions_of(&self, user_id: Uuid) -> usize {
        self.state
            .lock()
            .users
            .get(&user_id)
            .map_or(0, |sessions| sessions.len())
    }

    /// Total live sessions in this process.
    pub fn session_count(&self) -> usize {
        self.state.lock().users.values().map(Vec::len).sum()
    }

    /// Snapshot of the sessions a scope addresses at this instant.
    ///
    /// Channel scope is process-wide: every live session, regardless of
    /// channel membership.
    pub fn sessions_in(&self, scope: &Scope) -> Vec<Arc<Session>> {
        let state = self.state.lock();
        match scope {
            Scope::User(user_id) => state.users.get(user_id).cloned().unwrap_or_default(),
            Scope::Channel(_) | Scope::Everyone => {
                state.users.values().flatten().cloned().collect()
            }
        }
    }

    /// Best-effort, at-most-once delivery to every session in `scope`.
    ///
    /// The recipient set is snapshotted under the lock; writes happen after
    /// it is released. A failing session does not stop delivery to the rest.
    pub fn deliver(&self, scope: &Scope, frame: &Frame) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for session in self.sessions_in(scope) {
            report.record(session.id(), session.deliver(frame));
        }
        report
    }
}
