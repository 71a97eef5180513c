//! Real-time Hub
//!
//! One process-scoped instance that owns the registry, presence and voice
//! state and the chosen fanout. It is built explicitly at startup and passed
//! by reference into the protocol handler and every broadcast call site.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::events::{ServerEvent, VoiceStateEvent};
use super::fanout::{Fanout, LocalFanout};
use super::presence::PresenceTracker;
use super::registry::{ConnectionRegistry, Transition};
use super::session::Session;
use super::voice::{VoiceOccupancyTracker, VoiceOccupant};
use crate::config::{FanoutMode, RealtimeSettings};
use crate::domain::UserProfile;
use crate::infrastructure::metrics;

/// Behaviour switches for the hub.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeOptions {
    /// Leave every voice roster when a user's last session disconnects
    pub voice_auto_leave: bool,
    /// How long offline users stay in presence snapshots
    pub presence_retention: Option<Duration>,
}

impl Default for RealtimeOptions {
    fn default() -> Self {
        Self {
            voice_auto_leave: true,
            presence_retention: None,
        }
    }
}

impl From<&RealtimeSettings> for RealtimeOptions {
    fn from(settings: &RealtimeSettings) -> Self {
        Self {
            voice_auto_leave: settings.voice_auto_leave,
            presence_retention: settings.presence_retention(),
        }
    }
}

pub struct Realtime {
    registry: Arc<ConnectionRegistry>,
    presence: PresenceTracker,
    voice: VoiceOccupancyTracker,
    fanout: Arc<dyn Fanout>,
    voice_auto_leave: bool,
}

impl Realtime {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        fanout: Arc<dyn Fanout>,
        options: RealtimeOptions,
    ) -> Self {
        Self {
            registry,
            presence: PresenceTracker::new(options.presence_retention),
            voice: VoiceOccupancyTracker::new(),
            fanout,
            voice_auto_leave: options.voice_auto_leave,
        }
    }

    /// Single-process hub backed by `LocalFanout`.
    pub fn local(options: RealtimeOptions) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let fanout = Arc::new(LocalFanout::new(registry.clone()));
        Self::new(registry, fanout, options)
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn voice(&self) -> &VoiceOccupancyTracker {
        &self.voice
    }

    pub(crate) fn fanout(&self) -> &dyn Fanout {
        self.fanout.as_ref()
    }

    pub fn fanout_mode(&self) -> FanoutMode {
        self.fanout.mode()
    }

    /// Admit a session. Broadcasts an online delta if this is the user's
    /// first session, then sends the presence snapshot to this session only.
    pub async fn connect(&self, session: Arc<Session>, profile: &UserProfile) {
        let transition = self.registry.connect(session.clone());
        metrics::set_active_sessions(self.registry.session_count());

        match transition {
            Some(transition) => self.announce(transition, Some(profile)).await,
            None => self.presence.refresh_profile(profile),
        }

        let snapshot = ServerEvent::PresenceBulk(self.presence.snapshot());
        match snapshot.to_frame() {
            Ok(frame) => {
                if let Err(e) = session.deliver(&frame) {
                    tracing::debug!(session_id = %session.id(), error = %e, "Presence snapshot not delivered");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize presence snapshot"),
        }
    }

    /// Remove a session. Safe to call more than once for the same session;
    /// only the call that removes the user's last session has any effect
    /// beyond the registry.
    pub async fn disconnect(&self, session: &Session) {
        let transition = self.registry.disconnect(session.id(), session.user_id());
        metrics::set_active_sessions(self.registry.session_count());

        let Some(transition) = transition else {
            return;
        };

        // Decided before any await: a reconnect that rejoins voice while the
        // offline delta is in flight must not be undone.
        let user_id = transition.user_id;
        let vacated = if self.voice_auto_leave {
            self.voice
                .leave_all_if(user_id, || !self.registry.is_online(user_id))
        } else {
            Vec::new()
        };

        self.announce(transition, None).await;

        for (channel_id, _) in vacated {
            tracing::debug!(
                user_id = %user_id,
                channel_id = %channel_id,
                "Removed from voice roster on disconnect"
            );
            // Re-read so a join since the removal is not overwritten
            let users = self.voice.roster(&channel_id);
            self.broadcast_roster(channel_id, users).await;
        }
    }

    async fn announce(&self, transition: Transition, profile: Option<&UserProfile>) {
        let Some(update) = self.presence.record(transition, profile) else {
            tracing::debug!(user_id = %transition.user_id, epoch = transition.epoch, "Stale presence transition skipped");
            return;
        };
        tracing::info!(user_id = %update.user_id, status = %update.status, "Presence changed");
        self.fanout
            .broadcast_all(&ServerEvent::PresenceUpdate(update))
            .await;
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.registry.is_online(user_id)
    }

    pub fn online_user_ids(&self) -> Vec<Uuid> {
        self.registry.online_user_ids()
    }

    /// Deliver to every live session, regardless of channel membership.
    pub async fn broadcast_to_channel(&self, channel_id: &str, event: ServerEvent) {
        self.fanout.broadcast_to_channel(channel_id, &event).await;
    }

    /// Deliver to every live session of exactly this user; silently dropped
    /// if the user has none.
    pub async fn send_to_user(&self, user_id: Uuid, event: ServerEvent) {
        self.fanout.send_to_user(user_id, &event).await;
    }

    /// Add or replace the user in a voice roster and broadcast the roster.
    pub async fn join_voice(&self, channel_id: &str, profile: &UserProfile) -> Vec<VoiceOccupant> {
        let users = self.voice.join(channel_id, VoiceOccupant::from(profile));
        self.broadcast_roster(channel_id.to_string(), users.clone())
            .await;
        users
    }

    /// Remove the user from a voice roster (no-op if absent) and broadcast
    /// the roster.
    pub async fn leave_voice(&self, channel_id: &str, user_id: Uuid) -> Vec<VoiceOccupant> {
        let users = self.voice.leave(channel_id, user_id);
        self.broadcast_roster(channel_id.to_string(), users.clone())
            .await;
        users
    }

    async fn broadcast_roster(&self, channel_id: String, users: Vec<VoiceOccupant>) {
        let scope_id = channel_id.clone();
        let event = ServerEvent::VoiceStateUpdate(VoiceStateEvent { channel_id, users });
        self.fanout.broadcast_to_channel(&scope_id, &event).await;
    }
}
