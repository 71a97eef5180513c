//! WebSocket Message Types
//!
//! Client-to-server frames. Every frame is a flat JSON object; most carry a
//! `type`, a channel message may omit it.

use serde::Deserialize;
use uuid::Uuid;

use crate::application::realtime::{CallSignal, TypingTarget};
use crate::shared::error::FrameError;

/// A validated inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Ping,
    ChannelMessage {
        channel_id: Uuid,
        content: String,
        reply_to_id: Option<Uuid>,
    },
    DirectMessage {
        recipient_id: Uuid,
        content: String,
        reply_to_id: Option<Uuid>,
    },
    Call {
        signal: CallSignal,
        target_user_id: Uuid,
        room_name: Option<String>,
        call_type: Option<String>,
    },
    VoiceJoin {
        channel_id: String,
    },
    VoiceLeave {
        channel_id: String,
    },
    Typing(TypingTarget),
}

/// Wire shape before validation; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    channel_id: Option<String>,
    recipient_id: Option<String>,
    target_user_id: Option<String>,
    content: Option<String>,
    reply_to_id: Option<String>,
    room_name: Option<String>,
    call_type: Option<String>,
}

impl InboundFrame {
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let raw: RawFrame = serde_json::from_str(text)?;

        match raw.kind.as_deref() {
            Some("ping") => return Ok(Self::Ping),
            Some("dm") => {
                return Ok(Self::DirectMessage {
                    recipient_id: required_id("recipient_id", raw.recipient_id)?,
                    content: raw.content.ok_or(FrameError::MissingField("content"))?,
                    reply_to_id: optional_id("reply_to_id", raw.reply_to_id)?,
                })
            }
            Some("voice_join") => {
                return Ok(Self::VoiceJoin {
                    channel_id: required("channel_id", raw.channel_id)?,
                })
            }
            Some("voice_leave") => {
                return Ok(Self::VoiceLeave {
                    channel_id: required("channel_id", raw.channel_id)?,
                })
            }
            Some("typing") => {
                let target = match (raw.channel_id, raw.recipient_id) {
                    (Some(channel), _) => TypingTarget::Channel(parse_id("channel_id", channel)?),
                    (None, Some(recipient)) => {
                        TypingTarget::Direct(parse_id("recipient_id", recipient)?)
                    }
                    (None, None) => return Err(FrameError::MissingField("channel_id")),
                };
                return Ok(Self::Typing(target));
            }
            Some(kind) => {
                if let Some(signal) = CallSignal::from_type(kind) {
                    return Ok(Self::Call {
                        signal,
                        target_user_id: required_id("target_user_id", raw.target_user_id)?,
                        room_name: raw.room_name,
                        call_type: raw.call_type,
                    });
                }
            }
            None => {}
        }

        match (raw.channel_id, raw.content) {
            (Some(channel_id), Some(content)) => Ok(Self::ChannelMessage {
                channel_id: parse_id("channel_id", channel_id)?,
                content,
                reply_to_id: optional_id("reply_to_id", raw.reply_to_id)?,
            }),
            _ => match raw.kind {
                Some(kind) => Err(FrameError::UnknownType(kind)),
                None => Err(FrameError::MissingField("type")),
            },
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, FrameError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(FrameError::MissingField(field))
}

fn required_id(field: &'static str, value: Option<String>) -> Result<Uuid, FrameError> {
    parse_id(field, required(field, value)?)
}

fn optional_id(field: &'static str, value: Option<String>) -> Result<Option<Uuid>, FrameError> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| parse_id(field, v))
        .transpose()
}

fn parse_id(field: &'static str, value: String) -> Result<Uuid, FrameError> {
    value
        .parse()
        .map_err(|_| FrameError::InvalidId { field, value })
}
