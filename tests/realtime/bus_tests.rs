//! Distributed fanout semantics over an in-process loopback bus.
//!
//! The loopback stands in for Redis: publishing encodes the same envelope
//! the Redis fanout publishes and hands it to every process's
//! `dispatch_incoming`, the function the subscription loop runs per message.

use std::sync::Arc;

use async_trait::async_trait;
use chat_realtime::application::realtime::{
    ConnectionRegistry, Fanout, Realtime, RealtimeOptions, Scope, ServerEvent, Session,
};
use chat_realtime::config::FanoutMode;
use chat_realtime::infrastructure::pubsub::{dispatch_incoming, encode_envelope};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::{drain, of_type, profile};

struct LoopbackBus {
    subscribers: Vec<Arc<ConnectionRegistry>>,
}

#[async_trait]
impl Fanout for LoopbackBus {
    async fn publish(&self, scope: Scope, event: &ServerEvent) {
        let payload = encode_envelope(Uuid::new_v4(), event).unwrap();
        let topic = scope.topic();
        for registry in &self.subscribers {
            dispatch_incoming(registry, &topic, &payload).unwrap();
        }
    }

    fn mode(&self) -> FanoutMode {
        FanoutMode::Redis
    }
}

/// Two processes sharing one bus.
fn two_processes() -> (Realtime, Realtime) {
    let registry_a = Arc::new(ConnectionRegistry::new());
    let registry_b = Arc::new(ConnectionRegistry::new());
    let bus = Arc::new(LoopbackBus {
        subscribers: vec![registry_a.clone(), registry_b.clone()],
    });
    (
        Realtime::new(registry_a, bus.clone(), RealtimeOptions::default()),
        Realtime::new(registry_b, bus, RealtimeOptions::default()),
    )
}

#[tokio::test]
async fn test_user_event_crosses_processes() {
    let (a, b) = two_processes();
    let bob = Uuid::new_v4();
    let (bob_session, mut bob_rx) = Session::open(bob);
    b.registry().connect(bob_session);

    a.send_to_user(bob, ServerEvent::Pong).await;

    assert_eq!(drain(&mut bob_rx), vec![serde_json::json!({"type": "pong"})]);
}

#[tokio::test]
async fn test_publisher_receives_its_own_events_via_bus() {
    let (a, b) = two_processes();
    let (local, mut local_rx) = Session::open(Uuid::new_v4());
    let (remote, mut remote_rx) = Session::open(Uuid::new_v4());
    a.registry().connect(local);
    b.registry().connect(remote);

    a.broadcast_to_channel("general", ServerEvent::Pong).await;

    assert_eq!(drain(&mut local_rx).len(), 1);
    assert_eq!(drain(&mut remote_rx).len(), 1);
}

#[tokio::test]
async fn test_presence_and_dm_echo_across_processes() {
    let (a, b) = two_processes();
    let alice = profile("alice");
    let bob = profile("bob");

    let (bob_session, mut bob_rx) = Session::open(bob.id);
    b.connect(bob_session, &bob).await;
    drain(&mut bob_rx);

    let (alice_session, mut alice_rx) = Session::open(alice.id);
    a.connect(alice_session, &alice).await;

    let online = of_type(&drain(&mut bob_rx), "presence_update");
    assert_eq!(online.len(), 1);
    assert_eq!(online[0]["user_id"], alice.id.to_string());
    drain(&mut alice_rx);

    a.start_typing(
        chat_realtime::application::realtime::TypingTarget::Direct(bob.id),
        &alice,
    )
    .await;
    assert_eq!(of_type(&drain(&mut bob_rx), "typing_start").len(), 1);
    assert!(drain(&mut alice_rx).is_empty());
}

#[tokio::test]
async fn test_voice_rosters_are_per_process() {
    let (a, b) = two_processes();
    let (watcher, mut watcher_rx) = Session::open(Uuid::new_v4());
    a.registry().connect(watcher);

    let alice = profile("alice");
    let bob = profile("bob");
    a.join_voice("r", &alice).await;
    let roster_b = b.join_voice("r", &bob).await;

    // each process only knows the occupants that joined through it
    assert_eq!(roster_b.len(), 1);
    assert_eq!(roster_b[0].id, bob.id);
    assert_eq!(a.voice().roster("r").len(), 1);

    let updates = of_type(&drain(&mut watcher_rx), "voice_state_update");
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1]["users"].as_array().unwrap().len(), 1);
    assert_eq!(updates[1]["users"][0]["id"], bob.id.to_string());
}
