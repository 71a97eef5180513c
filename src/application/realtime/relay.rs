//! Call signal relay
//!
//! Stateless point-to-point forwarding of call signaling. No call state is
//! kept; a signal for a user with no live session is dropped without notice.

use uuid::Uuid;

use super::events::{CallSignalEvent, ServerEvent};
use super::hub::Realtime;
use crate::domain::UserProfile;

pub const DEFAULT_CALL_TYPE: &str = "video";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSignal {
    Invite,
    Accept,
    Reject,
    End,
}

impl CallSignal {
    /// Map an inbound frame `type` to a signal.
    pub fn from_type(frame_type: &str) -> Option<Self> {
        match frame_type {
            "call_invite" => Some(Self::Invite),
            "call_accept" => Some(Self::Accept),
            "call_reject" => Some(Self::Reject),
            "call_end" => Some(Self::End),
            _ => None,
        }
    }

    fn into_event(self, payload: CallSignalEvent) -> ServerEvent {
        match self {
            Self::Invite => ServerEvent::CallInvite(payload),
            Self::Accept => ServerEvent::CallAccept(payload),
            Self::Reject => ServerEvent::CallReject(payload),
            Self::End => ServerEvent::CallEnd(payload),
        }
    }
}

impl Realtime {
    /// Forward a call signal, enriched with the caller's display info, to
    /// every live session of `to`.
    pub async fn relay_call_signal(
        &self,
        signal: CallSignal,
        from: &UserProfile,
        to: Uuid,
        room_name: Option<String>,
        call_type: Option<String>,
    ) {
        let payload = CallSignalEvent {
            from_user_id: from.id,
            from_username: from.username.clone(),
            from_avatar: from.avatar_url.clone(),
            room_name,
            call_type: call_type.unwrap_or_else(|| DEFAULT_CALL_TYPE.to_owned()),
            target_user_id: to,
        };
        tracing::debug!(from = %from.id, to = %to, signal = ?signal, "Relaying call signal");
        self.send_to_user(to, signal.into_event(payload)).await;
    }
}
