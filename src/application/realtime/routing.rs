//! Direct routing and REST-side notifications
//!
//! Point-to-point events (DMs, moderation, typing in a DM) go to every live
//! session of the addressed user. Channel-scoped notifications go through
//! the same global channel broadcast as new messages.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::events::{
    ChannelMessageEvent, DirectMessageDeleteEvent, DirectMessageEvent, DirectMessageUpdateEvent,
    MessageDeleteEvent, MessageUpdateEvent, ModerationEvent, ServerEvent, TimeoutEvent,
    TypingStartEvent,
};
use super::hub::Realtime;
use crate::domain::{DirectMessage, Message, UserProfile};

/// Where a typing indicator is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingTarget {
    Channel(Uuid),
    Direct(Uuid),
}

impl Realtime {
    /// Broadcast a freshly persisted channel message.
    pub async fn publish_channel_message(&self, message: &Message, author: &UserProfile) {
        let event = ServerEvent::Message(ChannelMessageEvent {
            id: message.id,
            user: author.username.clone(),
            user_id: message.user_id,
            user_avatar: author.avatar_url.clone(),
            content: message.content.clone(),
            channel_id: message.channel_id,
            reply_to_id: message.reply_to_id,
            created_at: message.created_at,
        });
        self.broadcast_to_channel(&message.channel_id.to_string(), event)
            .await;
    }

    /// Deliver a persisted DM to the recipient and echo it to the sender's
    /// other sessions. Recipients with no live session get nothing; the
    /// message stays fetchable from storage.
    pub async fn send_direct_message(&self, dm: &DirectMessage, sender: &UserProfile) {
        let event = ServerEvent::Dm(DirectMessageEvent {
            id: dm.id,
            sender_id: dm.sender_id,
            recipient_id: dm.recipient_id,
            content: dm.content.clone(),
            user: sender.username.clone(),
            sender_avatar: sender.avatar_url.clone(),
            reply_to_id: dm.reply_to_id,
            created_at: dm.created_at,
        });
        self.notify_both(dm.sender_id, dm.recipient_id, event).await;
    }

    pub async fn notify_message_updated(&self, id: Uuid, channel_id: Uuid, content: &str) {
        let event = ServerEvent::MessageUpdate(MessageUpdateEvent {
            id,
            channel_id,
            content: content.to_owned(),
            is_edited: true,
        });
        self.broadcast_to_channel(&channel_id.to_string(), event)
            .await;
    }

    pub async fn notify_message_deleted(&self, id: Uuid, channel_id: Uuid) {
        let event = ServerEvent::MessageDelete(MessageDeleteEvent { id, channel_id });
        self.broadcast_to_channel(&channel_id.to_string(), event)
            .await;
    }

    pub async fn notify_dm_updated(&self, dm: &DirectMessage) {
        let event = ServerEvent::DmUpdate(DirectMessageUpdateEvent {
            id: dm.id,
            content: dm.content.clone(),
            is_edited: true,
            recipient_id: dm.recipient_id,
            sender_id: dm.sender_id,
        });
        self.notify_both(dm.sender_id, dm.recipient_id, event).await;
    }

    pub async fn notify_dm_deleted(&self, id: Uuid, sender_id: Uuid, recipient_id: Uuid) {
        let event = ServerEvent::DmDelete(DirectMessageDeleteEvent {
            id,
            recipient_id,
            sender_id,
        });
        self.notify_both(sender_id, recipient_id, event).await;
    }

    pub async fn notify_kicked(&self, user_id: Uuid, server_id: Uuid, reason: Option<String>) {
        let event = ServerEvent::Kicked(ModerationEvent { server_id, reason });
        self.send_to_user(user_id, event).await;
    }

    pub async fn notify_banned(&self, user_id: Uuid, server_id: Uuid, reason: Option<String>) {
        let event = ServerEvent::Banned(ModerationEvent { server_id, reason });
        self.send_to_user(user_id, event).await;
    }

    pub async fn notify_timeout(
        &self,
        user_id: Uuid,
        server_id: Uuid,
        expires_at: DateTime<Utc>,
        reason: Option<String>,
    ) {
        let event = ServerEvent::Timeout(TimeoutEvent {
            server_id,
            expires_at,
            reason,
        });
        self.send_to_user(user_id, event).await;
    }

    /// Channel typing goes to the channel; DM typing to the recipient only.
    pub async fn start_typing(&self, target: TypingTarget, user: &UserProfile) {
        let (channel_id, recipient_id) = match target {
            TypingTarget::Channel(id) => (Some(id), None),
            TypingTarget::Direct(id) => (None, Some(id)),
        };
        let event = ServerEvent::TypingStart(TypingStartEvent {
            channel_id,
            recipient_id,
            user_id: user.id,
            username: user.username.clone(),
        });
        match target {
            TypingTarget::Channel(id) => self.broadcast_to_channel(&id.to_string(), event).await,
            TypingTarget::Direct(id) => self.send_to_user(id, event).await,
        }
    }

    /// One copy per distinct party: a note-to-self is delivered once.
    async fn notify_both(&self, sender_id: Uuid, recipient_id: Uuid, event: ServerEvent) {
        let fanout = self.fanout();
        fanout.send_to_user(recipient_id, &event).await;
        if sender_id != recipient_id {
            fanout.send_to_user(sender_id, &event).await;
        }
    }
}
