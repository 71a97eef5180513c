//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a message in a channel.
///
/// Maps to the `messages` table:
/// - id: UUID PRIMARY KEY
/// - channel_id: UUID NOT NULL REFERENCES channels(id)
/// - user_id: UUID NOT NULL REFERENCES users(id)
/// - content: TEXT NOT NULL
/// - reply_to_id: UUID NULL REFERENCES messages(id)
/// - created_at: TIMESTAMPTZ DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the sender when creating a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub channel_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub reply_to_id: Option<Uuid>,
}

/// Repository trait for Message data access operations.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new channel message and return the stored row.
    async fn create(&self, message: NewMessage) -> Result<Message, AppError>;
}
