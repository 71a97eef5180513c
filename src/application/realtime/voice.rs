//! Voice Occupancy Tracker
//!
//! Per voice-channel rosters, deduplicated by user id. Rosters change only
//! through explicit join/leave (and, when enabled, the hub's auto-leave on a
//! user's last disconnect).

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserProfile;

/// One occupant descriptor as sent in `voice_state_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceOccupant {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<&UserProfile> for VoiceOccupant {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            avatar: profile.avatar_url.clone(),
        }
    }
}

#[derive(Default)]
pub struct VoiceOccupancyTracker {
    rooms: Mutex<HashMap<String, Vec<VoiceOccupant>>>,
}

impl VoiceOccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the user's entry. Returns the full roster afterwards.
    pub fn join(&self, channel_id: &str, occupant: VoiceOccupant) -> Vec<VoiceOccupant> {
        let mut rooms = self.rooms.lock();
        let roster = rooms.entry(channel_id.to_owned()).or_default();
        match roster.iter_mut().find(|o| o.id == occupant.id) {
            Some(existing) => *existing = occupant,
            None => roster.push(occupant),
        }
        roster.clone()
    }

    /// Remove the user's entry if present. Returns the full roster afterwards.
    pub fn leave(&self, channel_id: &str, user_id: Uuid) -> Vec<VoiceOccupant> {
        let mut rooms = self.rooms.lock();
        let Some(roster) = rooms.get_mut(channel_id) else {
            return Vec::new();
        };
        roster.retain(|o| o.id != user_id);
        let remaining = roster.clone();
        if remaining.is_empty() {
            rooms.remove(channel_id);
        }
        remaining
    }

    /// Remove the user from every roster, but only if `condition` still
    /// holds once the roster lock is taken. A join that races the check
    /// either lands after the removal or makes `condition` false. Returns
    /// each affected channel with its roster afterwards.
    pub fn leave_all_if(
        &self,
        user_id: Uuid,
        condition: impl FnOnce() -> bool,
    ) -> Vec<(String, Vec<VoiceOccupant>)> {
        let mut rooms = self.rooms.lock();
        if !condition() {
            return Vec::new();
        }
        remove_everywhere(&mut rooms, user_id)
    }

    pub fn roster(&self, channel_id: &str) -> Vec<VoiceOccupant> {
        self.rooms.lock().get(channel_id).cloned().unwrap_or_default()
    }

    /// Number of channels with at least one occupant.
    pub fn occupied_channels(&self) -> usize {
        self.rooms.lock().len()
    }
}

fn remove_everywhere(
    rooms: &mut HashMap<String, Vec<VoiceOccupant>>,
    user_id: Uuid,
) -> Vec<(String, Vec<VoiceOccupant>)> {
    let mut affected = Vec::new();
    for (channel_id, roster) in rooms.iter_mut() {
        let before = roster.len();
        roster.retain(|o| o.id != user_id);
        if roster.len() != before {
            affected.push((channel_id.clone(), roster.clone()));
        }
    }
    rooms.retain(|_, roster| !roster.is_empty());
    affected
}
