//! Redis fanout and the bus subscription loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::Client;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::realtime::{ConnectionRegistry, DeliveryReport, Fanout, Scope, ServerEvent};
use crate::config::FanoutMode;
use crate::infrastructure::metrics;
use crate::shared::error::BusError;

/// Payload published on every topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEnvelope {
    /// Instance id of the publishing process
    pub origin: Uuid,
    pub event: ServerEvent,
}

#[derive(Serialize)]
struct OutgoingEnvelope<'a> {
    origin: Uuid,
    event: &'a ServerEvent,
}

pub fn encode_envelope(origin: Uuid, event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutgoingEnvelope { origin, event })
}

/// Decode one bus message and deliver it into this process's registry.
///
/// Used by the subscription loop for every message, whichever process
/// published it.
pub fn dispatch_incoming(
    registry: &ConnectionRegistry,
    topic: &str,
    payload: &str,
) -> Result<(Scope, DeliveryReport), BusError> {
    let scope = Scope::from_topic(topic).ok_or_else(|| BusError::UnknownTopic(topic.to_owned()))?;
    let envelope: BusEnvelope = serde_json::from_str(payload)?;
    let frame = envelope.event.to_frame()?;

    let report = registry.deliver(&scope, &frame);
    report.log(&scope, envelope.event.kind());
    Ok((scope, report))
}

/// Publish-only fanout. Holds no registry: local sessions are reached through
/// the subscription loop like every other process's sessions.
pub struct RedisFanout {
    conn: ConnectionManager,
    instance_id: Uuid,
}

impl RedisFanout {
    pub fn new(conn: ConnectionManager, instance_id: Uuid) -> Self {
        Self { conn, instance_id }
    }

    async fn try_publish(&self, topic: &str, payload: String) -> Result<i64, BusError> {
        let mut conn = self.conn.clone();
        let receivers = redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await?;
        Ok(receivers)
    }
}

#[async_trait]
impl Fanout for RedisFanout {
    async fn publish(&self, scope: Scope, event: &ServerEvent) {
        let topic = scope.topic();
        let payload = match encode_envelope(self.instance_id, event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(topic = %topic, event = event.kind(), error = %e, "Failed to encode bus envelope");
                return;
            }
        };

        match self.try_publish(&topic, payload).await {
            Ok(receivers) => {
                debug!(topic = %topic, event = event.kind(), receivers, "Published to bus")
            }
            Err(e) => warn!(topic = %topic, event = event.kind(), error = %e, "Bus publish failed, event dropped"),
        }
    }

    fn mode(&self) -> FanoutMode {
        FanoutMode::Redis
    }
}

/// The one long-lived subscription loop of a process.
pub struct BusSubscriber {
    client: Client,
    registry: Arc<ConnectionRegistry>,
    instance_id: Uuid,
    retry_delay: Duration,
}

impl BusSubscriber {
    pub fn new(
        client: Client,
        registry: Arc<ConnectionRegistry>,
        instance_id: Uuid,
        retry_delay: Duration,
    ) -> Self {
        Self {
            client,
            registry,
            instance_id,
            retry_delay,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Subscribe and dispatch forever. Any read error tears the subscription
    /// down and retries after a fixed delay; this never returns.
    #[instrument(skip(self), fields(instance_id = %self.instance_id))]
    pub async fn run(self) {
        loop {
            let error = self.subscribe_once().await;
            metrics::record_bus_resubscribe();
            warn!(
                error = %error,
                retry_in_ms = self.retry_delay.as_millis() as u64,
                "Bus subscription lost, resubscribing"
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    async fn subscribe_once(&self) -> BusError {
        let mut pubsub = match self.client.get_async_pubsub().await {
            Ok(pubsub) => pubsub,
            Err(e) => return e.into(),
        };

        let (patterns, topics) = Scope::subscriptions();
        for pattern in &patterns {
            if let Err(e) = pubsub.psubscribe(pattern).await {
                return e.into();
            }
        }
        for topic in topics {
            if let Err(e) = pubsub.subscribe(topic).await {
                return e.into();
            }
        }
        info!(patterns = ?patterns, topics = ?topics, "Bus subscription established");

        let mut messages = pubsub.on_message();
        while let Some(msg) = messages.next().await {
            let topic = msg.get_channel_name();
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(topic = %topic, error = %e, "Unreadable bus payload dropped");
                    continue;
                }
            };
            if let Err(e) = dispatch_incoming(&self.registry, topic, &payload) {
                warn!(topic = %topic, error = %e, "Bus message dropped");
            }
        }
        BusError::StreamEnded
    }
}
