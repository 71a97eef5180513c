//! Fanout
//!
//! The single delivery interface behind channel broadcast, per-user routing
//! and call-signal relay. Two implementations exist: `LocalFanout` delivers
//! straight into this process's registry, and the Redis bus in
//! `infrastructure::pubsub` publishes on a scope topic and lets every
//! process's subscription loop deliver locally. The implementation is picked
//! once at startup; callers only ever see `dyn Fanout`.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::events::ServerEvent;
use super::registry::ConnectionRegistry;
use super::session::DeliveryReport;
use crate::config::FanoutMode;

const CHANNEL_PREFIX: &str = "channel:";
const USER_PREFIX: &str = "user:";
const EVERYONE_TOPIC: &str = "broadcast";

/// Routing scope of one fanout, and its bus topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `channel:<id>`; delivered to every live session.
    Channel(String),
    /// `user:<uuid>`; delivered to that user's sessions only.
    User(Uuid),
    /// `broadcast`; process-wide events such as presence deltas.
    Everyone,
}

impl Scope {
    pub fn topic(&self) -> String {
        match self {
            Scope::Channel(id) => format!("{}{}", CHANNEL_PREFIX, id),
            Scope::User(id) => format!("{}{}", USER_PREFIX, id),
            Scope::Everyone => EVERYONE_TOPIC.to_string(),
        }
    }

    pub fn from_topic(topic: &str) -> Option<Self> {
        if let Some(id) = topic.strip_prefix(CHANNEL_PREFIX) {
            return (!id.is_empty()).then(|| Scope::Channel(id.to_string()));
        }
        if let Some(id) = topic.strip_prefix(USER_PREFIX) {
            return id.parse().ok().map(Scope::User);
        }
        (topic == EVERYONE_TOPIC).then_some(Scope::Everyone)
    }

    /// Topics a subscriber must listen on: `(patterns, exact topics)`.
    pub fn subscriptions() -> ([String; 2], [&'static str; 1]) {
        (
            [format!("{}*", CHANNEL_PREFIX), format!("{}*", USER_PREFIX)],
            [EVERYONE_TOPIC],
        )
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.topic())
    }
}

/// Delivery of one logical event to a set of sessions.
///
/// Fire-and-forget: nothing is returned to the caller, and per-session or
/// bus failures are logged by the implementation.
#[async_trait]
pub trait Fanout: Send + Sync {
    /// Deliver `event` to every live session `scope` addresses.
    async fn publish(&self, scope: Scope, event: &ServerEvent);

    fn mode(&self) -> FanoutMode;

    /// Every live session, regardless of channel membership.
    async fn broadcast_to_channel(&self, channel_id: &str, event: &ServerEvent) {
        self.publish(Scope::Channel(channel_id.to_string()), event)
            .await
    }

    /// Every live session of exactly `user_id`; dropped if there are none.
    async fn send_to_user(&self, user_id: Uuid, event: &ServerEvent) {
        self.publish(Scope::User(user_id), event).await
    }

    async fn broadcast_all(&self, event: &ServerEvent) {
        self.publish(Scope::Everyone, event).await
    }
}

/// Serialize once and deliver into `registry`.
pub fn deliver_locally(
    registry: &ConnectionRegistry,
    scope: &Scope,
    event: &ServerEvent,
) -> Option<DeliveryReport> {
    let frame = match event.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(scope = %scope, event = event.kind(), error = %e, "Failed to serialize event");
            return None;
        }
    };
    let report = registry.deliver(scope, &frame);
    report.log(scope, event.kind());
    Some(report)
}

/// Single-process fanout.
pub struct LocalFanout {
    registry: Arc<ConnectionRegistry>,
}

impl LocalFanout {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Fanout for LocalFanout {
    async fn publish(&self, scope: Scope, event: &ServerEvent) {
        deliver_locally(&self.registry, &scope, event);
    }

    fn mode(&self) -> FanoutMode {
        FanoutMode::Local
    }
}
