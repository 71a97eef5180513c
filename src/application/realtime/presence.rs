//! Presence Tracker
//!
//! Last-known online/offline status and display info for every user seen
//! since process start. Entries are created on first connect, refreshed on
//! reconnect, and only pruned when a retention window is configured.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{PresenceBulkEvent, PresenceUpdateEvent};
use super::registry::Transition;
use crate::domain::UserProfile;

/// A user's visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
struct PresenceEntry {
    status: PresenceStatus,
    username: String,
    avatar_url: Option<String>,
    /// Epoch of the registry transition that produced `status`
    epoch: u64,
    changed_at: DateTime<Utc>,
}

impl PresenceEntry {
    fn to_event(&self, user_id: Uuid) -> PresenceUpdateEvent {
        PresenceUpdateEvent {
            user_id,
            status: self.status,
            username: self.username.clone(),
            avatar: self.avatar_url.clone(),
        }
    }
}

pub struct PresenceTracker {
    entries: DashMap<Uuid, PresenceEntry>,
    retention: Option<chrono::Duration>,
}

impl PresenceTracker {
    /// `retention` bounds how long offline users stay in snapshots.
    /// `None` keeps every user ever seen.
    pub fn new(retention: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            retention: retention.and_then(|r| chrono::Duration::from_std(r).ok()),
        }
    }

    /// Apply a registry transition. Returns the delta to broadcast, or `None`
    /// if a newer transition for this user was already applied.
    pub fn record(
        &self,
        transition: Transition,
        profile: Option<&UserProfile>,
    ) -> Option<PresenceUpdateEvent> {
        let now = Utc::now();
        match self.entries.entry(transition.user_id) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.epoch >= transition.epoch {
                    return None;
                }
                entry.status = transition.status;
                entry.epoch = transition.epoch;
                entry.changed_at = now;
                if let Some(profile) = profile {
                    entry.username = profile.username.clone();
                    entry.avatar_url = profile.avatar_url.clone();
                }
                Some(entry.to_event(transition.user_id))
            }
            Entry::Vacant(vacant) => {
                let entry = PresenceEntry {
                    status: transition.status,
                    username: profile.map(|p| p.username.clone()).unwrap_or_default(),
                    avatar_url: profile.and_then(|p| p.avatar_url.clone()),
                    epoch: transition.epoch,
                    changed_at: now,
                };
                let event = entry.to_event(transition.user_id);
                vacant.insert(entry);
                Some(event)
            }
        }
    }

    /// Refresh cached display info without a status change, e.g. when a user
    /// opens an additional session after renaming.
    pub fn refresh_profile(&self, profile: &UserProfile) {
        if let Some(mut entry) = self.entries.get_mut(&profile.id) {
            entry.username = profile.username.clone();
            entry.avatar_url = profile.avatar_url.clone();
        }
    }

    /// Last known status for every retained user.
    pub fn snapshot(&self) -> PresenceBulkEvent {
        self.prune();
        let mut users: Vec<PresenceUpdateEvent> = self
            .entries
            .iter()
            .map(|entry| entry.value().to_event(*entry.key()))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username).then(a.user_id.cmp(&b.user_id)));
        PresenceBulkEvent { users }
    }

    pub fn status_of(&self, user_id: Uuid) -> Option<PresenceStatus> {
        self.entries.get(&user_id).map(|entry| entry.status)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop offline entries older than the retention window.
    fn prune(&self) {
        let Some(retention) = self.retention else {
            return;
        };
        let cutoff = Utc::now() - retention;
        self.entries.retain(|_, entry| {
            entry.status == PresenceStatus::Online || entry.changed_at > cutoff
        });
    }
}
