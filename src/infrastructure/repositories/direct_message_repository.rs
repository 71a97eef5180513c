//! Direct Message Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DirectMessage, DirectMessageRepository, NewDirectMessage};
use crate::shared::error::AppError;

pub struct PgDirectMessageRepository {
    pool: PgPool,
}

impl PgDirectMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DirectMessageRow {
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    content: String,
    reply_to_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<DirectMessageRow> for DirectMessage {
    fn from(row: DirectMessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            content: row.content,
            reply_to_id: row.reply_to_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl DirectMessageRepository for PgDirectMessageRepository {
    async fn create(&self, message: NewDirectMessage) -> Result<DirectMessage, AppError> {
        let row = sqlx::query_as::<_, DirectMessageRow>(
            r#"
            INSERT INTO direct_messages (id, sender_id, recipient_id, content, reply_to_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sender_id, recipient_id, content, reply_to_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.content)
        .bind(message.reply_to_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
