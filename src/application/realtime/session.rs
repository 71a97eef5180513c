//! Live sessions and per-fanout delivery results.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::Frame;
use super::fanout::Scope;
use crate::infrastructure::metrics;
use crate::shared::error::DeliveryError;

/// One live transport connection belonging to a user.
///
/// The transport handle is the sending half of the connection's outbound
/// queue; the connection task owns the receiving half and writes each frame
/// to the socket.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    user_id: Uuid,
    connected_at: DateTime<Utc>,
    outbound: mpsc::UnboundedSender<Frame>,
}

impl Session {
    pub fn new(user_id: Uuid, outbound: mpsc::UnboundedSender<Frame>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            outbound,
        }
    }

    /// Create a session together with the queue its writer drains.
    pub fn open(user_id: Uuid) -> (Arc<Self>, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::new(user_id, tx)), rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Whether the writer side of this session has gone away.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    /// Queue a frame for this session. Never blocks.
    pub fn deliver(&self, frame: &Frame) -> Result<(), DeliveryError> {
        self.outbound
            .send(Frame::clone(frame))
            .map_err(|_| DeliveryError::SessionClosed(self.id))
    }
}

/// Outcome of one fanout across a set of sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    /// Sessions whose write failed; they are reaped by their own disconnect path.
    pub failed: Vec<Uuid>,
}

impl DeliveryReport {
    pub fn record(&mut self, session_id: Uuid, result: Result<(), DeliveryError>) {
        self.attempted += 1;
        match result {
            Ok(()) => self.delivered += 1,
            Err(_) => self.failed.push(session_id),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Emit the aggregated result. Failures are logged, never raised.
    pub fn log(&self, scope: &Scope, kind: &str) {
        metrics::record_deliveries(self.delivered, self.failed.len());

        if self.is_clean() {
            tracing::debug!(
                scope = %scope,
                event = kind,
                delivered = self.delivered,
                "Fanout complete"
            );
        } else {
            tracing::warn!(
                scope = %scope,
                event = kind,
                delivered = self.delivered,
                failed = self.failed.len(),
                failed_sessions = ?self.failed,
                "Fanout had failed deliveries"
            );
        }
    }
}
