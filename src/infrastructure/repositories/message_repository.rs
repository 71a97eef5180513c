//! Message Repository Implementation
//!
//! PostgreSQL persistence for channel messages sent over the websocket.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Message, MessageRepository, NewMessage};
use crate::shared::error::AppError;

pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    channel_id: Uuid,
    user_id: Uuid,
    content: String,
    reply_to_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            channel_id: self.channel_id,
            user_id: self.user_id,
            content: self.content,
            reply_to_id: self.reply_to_id,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: NewMessage) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, channel_id, user_id, content, reply_to_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, channel_id, user_id, content, reply_to_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message.channel_id)
        .bind(message.user_id)
        .bind(&message.content)
        .bind(message.reply_to_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }
}
