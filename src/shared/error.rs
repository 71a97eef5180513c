//! Error Types
//!
//! The error kinds of the real-time core and of its persistence
//! collaborators. None of them ever reach a client as a response; they are
//! logged and the affected handshake, frame, delivery or bus read is dropped.

/// Failure of a persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handshake rejection. The connection is closed with a policy-violation code.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing credential")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("invalid subject in token: {0}")]
    InvalidSubject(String),

    #[error("unknown user {0}")]
    UnknownUser(uuid::Uuid),

    #[error("account {0} is inactive")]
    InactiveAccount(uuid::Uuid),

    #[error("user lookup failed: {0}")]
    Lookup(#[from] AppError),
}

/// An inbound frame that could not be handled. The frame is dropped and the
/// connection stays open.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a valid identifier: {value}")]
    InvalidId { field: &'static str, value: String },

    #[error("unrecognised frame type `{0}`")]
    UnknownType(String),

    #[error("persistence failed: {0}")]
    Persistence(#[from] AppError),
}

impl FrameError {
    /// Metric label for the drop reason.
    pub fn reason(&self) -> &'static str {
        match self {
            FrameError::InvalidJson(_) => "invalid_json",
            FrameError::MissingField(_) => "missing_field",
            FrameError::InvalidId { .. } => "invalid_id",
            FrameError::UnknownType(_) => "unknown_type",
            FrameError::Persistence(_) => "persistence",
        }
    }
}

/// A write to one session failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("session {0} is closed")]
    SessionClosed(uuid::Uuid),
}

/// Distributed fanout failure. Recovered locally, never surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("malformed bus payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown topic `{0}`")]
    UnknownTopic(String),

    #[error("subscription stream ended")]
    StreamEnded,
}
