//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Represents a user account in the chat system.
///
/// Maps to the `users` table:
/// - id: UUID PRIMARY KEY
/// - username: VARCHAR NOT NULL UNIQUE
/// - email: VARCHAR NOT NULL UNIQUE
/// - avatar_url: VARCHAR NULL
/// - is_active: BOOLEAN DEFAULT TRUE
/// - created_at: TIMESTAMPTZ DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    pub username: String,

    pub email: String,

    /// URL to user's avatar image
    pub avatar_url: Option<String>,

    /// Inactive accounts are refused at the WebSocket handshake
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display info attached to presence, voice and outbound events.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// The subset of a user that the real-time core caches and fans out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(id: Uuid, username: impl Into<String>, avatar_url: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            avatar_url,
        }
    }
}

/// Repository trait for User data access operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
}
