//! Inbound frame dispatch
//!
//! Wires each validated frame to its persistence collaborator (if any) and
//! then to the real-time hub. Frames on one connection are handled in
//! arrival order by the connection's own task.

use std::sync::Arc;

use crate::application::realtime::{Realtime, ServerEvent, Session};
use crate::domain::{
    DirectMessageRepository, MessageRepository, NewDirectMessage, NewMessage, UserProfile,
};
use crate::shared::error::FrameError;

use super::messages::InboundFrame;

#[derive(Clone)]
pub struct FrameDispatcher {
    realtime: Arc<Realtime>,
    messages: Arc<dyn MessageRepository>,
    direct_messages: Arc<dyn DirectMessageRepository>,
}

impl FrameDispatcher {
    pub fn new(
        realtime: Arc<Realtime>,
        messages: Arc<dyn MessageRepository>,
        direct_messages: Arc<dyn DirectMessageRepository>,
    ) -> Self {
        Self {
            realtime,
            messages,
            direct_messages,
        }
    }

    /// Handle one text frame from `user` on `session`.
    ///
    /// An error means the frame was dropped; the caller logs it and keeps the
    /// connection open.
    pub async fn handle(
        &self,
        session: &Session,
        user: &UserProfile,
        text: &str,
    ) -> Result<(), FrameError> {
        match InboundFrame::parse(text)? {
            InboundFrame::Ping => {
                let frame = ServerEvent::Pong.to_frame()?;
                if let Err(e) = session.deliver(&frame) {
                    tracing::debug!(session_id = %session.id(), error = %e, "Pong not delivered");
                }
            }

            InboundFrame::ChannelMessage {
                channel_id,
                content,
                reply_to_id,
            } => {
                let message = self
                    .messages
                    .create(NewMessage {
                        channel_id,
                        user_id: user.id,
                        content,
                        reply_to_id,
                    })
                    .await?;
                self.realtime.publish_channel_message(&message, user).await;
            }

            InboundFrame::DirectMessage {
                recipient_id,
                content,
                reply_to_id,
            } => {
                let dm = self
                    .direct_messages
                    .create(NewDirectMessage {
                        sender_id: user.id,
                        recipient_id,
                        content,
                        reply_to_id,
                    })
                    .await?;
                self.realtime.send_direct_message(&dm, user).await;
            }

            InboundFrame::Call {
                signal,
                target_user_id,
                room_name,
                call_type,
            } => {
                self.realtime
                    .relay_call_signal(signal, user, target_user_id, room_name, call_type)
                    .await;
            }

            InboundFrame::VoiceJoin { channel_id } => {
                self.realtime.join_voice(&channel_id, user).await;
            }

            InboundFrame::VoiceLeave { channel_id } => {
                self.realtime.leave_voice(&channel_id, user.id).await;
            }

            InboundFrame::Typing(target) => {
                self.realtime.start_typing(target, user).await;
            }
        }
        Ok(())
    }
}
