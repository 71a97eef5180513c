//! Direct message entity and repository trait.
//!
//! Maps to the `direct_messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A one-to-one message between two users.
///
/// Maps to the `direct_messages` table:
/// - id: UUID PRIMARY KEY
/// - sender_id: UUID NOT NULL REFERENCES users(id)
/// - recipient_id: UUID NOT NULL REFERENCES users(id)
/// - content: TEXT NOT NULL
/// - reply_to_id: UUID NULL REFERENCES direct_messages(id)
/// - created_at: TIMESTAMPTZ DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDirectMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub reply_to_id: Option<Uuid>,
}

/// Repository trait for DirectMessage data access operations.
#[async_trait]
pub trait DirectMessageRepository: Send + Sync {
    /// Persist a new direct message and return the stored row.
    async fn create(&self, message: NewDirectMessage) -> Result<DirectMessage, AppError>;
}
