//! Inbound frames through the dispatcher, with in-memory persistence.

use std::sync::Arc;

use chat_realtime::application::realtime::Session;
use chat_realtime::presentation::websocket::FrameDispatcher;
use chat_realtime::shared::error::FrameError;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::{
    drain, local_hub, of_type, profile, InMemoryDirectMessages, InMemoryMessages,
};

struct Fixture {
    dispatcher: FrameDispatcher,
    messages: Arc<InMemoryMessages>,
    direct_messages: Arc<InMemoryDirectMessages>,
    hub: Arc<chat_realtime::application::realtime::Realtime>,
}

fn fixture(messages: InMemoryMessages) -> Fixture {
    let hub = local_hub();
    let messages = Arc::new(messages);
    let direct_messages = Arc::new(InMemoryDirectMessages::default());
    Fixture {
        dispatcher: FrameDispatcher::new(hub.clone(), messages.clone(), direct_messages.clone()),
        messages,
        direct_messages,
        hub,
    }
}

#[tokio::test]
async fn test_ping_answers_only_the_sender() {
    let fx = fixture(InMemoryMessages::default());
    let me = profile("me");
    let (session, mut rx) = Session::open(me.id);
    let (other, mut other_rx) = Session::open(Uuid::new_v4());
    fx.hub.registry().connect(session.clone());
    fx.hub.registry().connect(other);

    fx.dispatcher
        .handle(&session, &me, r#"{"type":"ping"}"#)
        .await
        .unwrap();

    assert_eq!(drain(&mut rx), vec![serde_json::json!({"type": "pong"})]);
    assert!(drain(&mut other_rx).is_empty());
}

#[tokio::test]
async fn test_channel_message_is_persisted_then_broadcast() {
    let fx = fixture(InMemoryMessages::default());
    let author = profile("alice");
    let (session, mut rx) = Session::open(author.id);
    let (other, mut other_rx) = Session::open(Uuid::new_v4());
    fx.hub.registry().connect(session.clone());
    fx.hub.registry().connect(other);
    let channel_id = Uuid::new_v4();

    fx.dispatcher
        .handle(
            &session,
            &author,
            &format!(r#"{{"channel_id":"{channel_id}","content":"hello"}}"#),
        )
        .await
        .unwrap();

    let stored = fx.messages.created.lock().clone();
    assert_eq!(stored.len(), 1);

    for frames in [drain(&mut rx), drain(&mut other_rx)] {
        let messages = of_type(&frames, "message");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["id"], stored[0].id.to_string());
        assert_eq!(messages[0]["user"], "alice");
        assert_eq!(messages[0]["user_id"], author.id.to_string());
        assert_eq!(messages[0]["channel_id"], channel_id.to_string());
        assert_eq!(messages[0]["content"], "hello");
        assert!(messages[0]["reply_to_id"].is_null());
    }
}

#[tokio::test]
async fn test_dm_reaches_both_parties_only() {
    let fx = fixture(InMemoryMessages::default());
    let sender = profile("alice");
    let recipient = Uuid::new_v4();
    let (s, mut s_rx) = Session::open(sender.id);
    let (r, mut r_rx) = Session::open(recipient);
    let (b, mut b_rx) = Session::open(Uuid::new_v4());
    fx.hub.registry().connect(s.clone());
    fx.hub.registry().connect(r);
    fx.hub.registry().connect(b);

    fx.dispatcher
        .handle(
            &s,
            &sender,
            &format!(r#"{{"type":"dm","recipient_id":"{recipient}","content":"psst"}}"#),
        )
        .await
        .unwrap();

    assert_eq!(fx.direct_messages.created.lock().len(), 1);
    assert_eq!(of_type(&drain(&mut s_rx), "dm").len(), 1);
    assert_eq!(of_type(&drain(&mut r_rx), "dm").len(), 1);
    assert!(drain(&mut b_rx).is_empty());
}

#[tokio::test]
async fn test_call_signal_goes_to_target_only() {
    let fx = fixture(InMemoryMessages::default());
    let caller = profile("alice");
    let target = Uuid::new_v4();
    let (c, mut c_rx) = Session::open(caller.id);
    let (t, mut t_rx) = Session::open(target);
    fx.hub.registry().connect(c.clone());
    fx.hub.registry().connect(t);

    fx.dispatcher
        .handle(
            &c,
            &caller,
            &format!(r#"{{"type":"call_reject","target_user_id":"{target}","call_type":"audio"}}"#),
        )
        .await
        .unwrap();

    let frames = drain(&mut t_rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "call_reject");
    assert_eq!(frames[0]["from_user_id"], caller.id.to_string());
    assert_eq!(frames[0]["call_type"], "audio");
    assert!(frames[0]["room_name"].is_null());
    assert!(drain(&mut c_rx).is_empty());
}

#[tokio::test]
async fn test_voice_join_uses_authenticated_profile() {
    let fx = fixture(InMemoryMessages::default());
    let me = profile("me");
    let (session, _rx) = Session::open(me.id);
    fx.hub.registry().connect(session.clone());

    fx.dispatcher
        .handle(
            &session,
            &me,
            r#"{"type":"voice_join","channel_id":"lobby","username":"spoofed"}"#,
        )
        .await
        .unwrap();

    let roster = fx.hub.voice().roster("lobby");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, me.id);
    assert_eq!(roster[0].username, "me");
}

#[tokio::test]
async fn test_malformed_frame_is_dropped_without_side_effects() {
    let fx = fixture(InMemoryMessages::default());
    let me = profile("me");
    let (session, mut rx) = Session::open(me.id);
    fx.hub.registry().connect(session.clone());

    let err = fx
        .dispatcher
        .handle(&session, &me, r#"{"channel_id":"not-a-uuid","content":"x"}"#)
        .await
        .unwrap_err();

    assert!(matches!(err, FrameError::InvalidId { field: "channel_id", .. }));
    assert!(fx.messages.created.lock().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_persistence_failure_skips_broadcast() {
    let fx = fixture(InMemoryMessages::failing());
    let me = profile("me");
    let (session, mut rx) = Session::open(me.id);
    fx.hub.registry().connect(session.clone());

    let err = fx
        .dispatcher
        .handle(
            &session,
            &me,
            &format!(r#"{{"channel_id":"{}","content":"x"}}"#, Uuid::new_v4()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.reason(), "persistence");
    assert!(drain(&mut rx).is_empty());
}
