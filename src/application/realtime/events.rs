//! Outbound event types
//!
//! Every frame the server pushes to a client is one `ServerEvent`, serialized
//! as a flat JSON object whose `type` field names the event. Events are
//! transient; nothing here is persisted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::presence::PresenceStatus;
use super::voice::VoiceOccupant;

/// A pre-serialized event, shared by every session it is fanned out to.
pub type Frame = Arc<str>;

/// Event envelope pushed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to a client `ping`
    Pong,

    // Channel messages
    Message(ChannelMessageEvent),
    MessageUpdate(MessageUpdateEvent),
    MessageDelete(MessageDeleteEvent),

    // Direct messages
    Dm(DirectMessageEvent),
    DmUpdate(DirectMessageUpdateEvent),
    DmDelete(DirectMessageDeleteEvent),

    // Call signaling
    CallInvite(CallSignalEvent),
    CallAccept(CallSignalEvent),
    CallReject(CallSignalEvent),
    CallEnd(CallSignalEvent),

    // Moderation
    Kicked(ModerationEvent),
    Banned(ModerationEvent),
    Timeout(TimeoutEvent),

    // Presence
    PresenceUpdate(PresenceUpdateEvent),
    PresenceBulk(PresenceBulkEvent),

    VoiceStateUpdate(VoiceStateEvent),
    TypingStart(TypingStartEvent),
}

impl ServerEvent {
    /// Wire name of the event, used for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Pong => "pong",
            ServerEvent::Message(_) => "message",
            ServerEvent::MessageUpdate(_) => "message_update",
            ServerEvent::MessageDelete(_) => "message_delete",
            ServerEvent::Dm(_) => "dm",
            ServerEvent::DmUpdate(_) => "dm_update",
            ServerEvent::DmDelete(_) => "dm_delete",
            ServerEvent::CallInvite(_) => "call_invite",
            ServerEvent::CallAccept(_) => "call_accept",
            ServerEvent::CallReject(_) => "call_reject",
            ServerEvent::CallEnd(_) => "call_end",
            ServerEvent::Kicked(_) => "kicked",
            ServerEvent::Banned(_) => "banned",
            ServerEvent::Timeout(_) => "timeout",
            ServerEvent::PresenceUpdate(_) => "presence_update",
            ServerEvent::PresenceBulk(_) => "presence_bulk",
            ServerEvent::VoiceStateUpdate(_) => "voice_state_update",
            ServerEvent::TypingStart(_) => "typing_start",
        }
    }

    /// Serialize once for delivery to any number of sessions.
    pub fn to_frame(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Frame::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessageEvent {
    pub id: Uuid,
    /// Author username
    pub user: String,
    pub user_id: Uuid,
    pub user_avatar: Option<String>,
    pub content: String,
    pub channel_id: Uuid,
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdateEvent {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub content: String,
    pub is_edited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDeleteEvent {
    pub id: Uuid,
    pub channel_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessageEvent {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    /// Sender username
    pub user: String,
    pub sender_avatar: Option<String>,
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessageUpdateEvent {
    pub id: Uuid,
    pub content: String,
    pub is_edited: bool,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessageDeleteEvent {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSignalEvent {
    pub from_user_id: Uuid,
    pub from_username: String,
    pub from_avatar: Option<String>,
    pub room_name: Option<String>,
    pub call_type: String,
    pub target_user_id: Uuid,
}

/// Payload of `kicked` and `banned`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub server_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutEvent {
    pub server_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdateEvent {
    pub user_id: Uuid,
    pub status: PresenceStatus,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceBulkEvent {
    pub users: Vec<PresenceUpdateEvent>,
}

/// Always the full roster of the channel, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceStateEvent {
    pub channel_id: String,
    pub users: Vec<VoiceOccupant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingStartEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<Uuid>,
    pub user_id: Uuid,
    pub username: String,
}
