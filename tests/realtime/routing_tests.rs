//! Channel broadcast, per-user routing and delivery isolation.

use chat_realtime::application::realtime::{
    deliver_locally, PresenceStatus, Scope, ServerEvent, Session,
};
use chat_realtime::application::realtime::events::PresenceUpdateEvent;
use chat_realtime::domain::DirectMessage;
use chrono::Utc;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::{drain, local_hub, of_type, profile};

fn ping_like() -> ServerEvent {
    ServerEvent::PresenceUpdate(PresenceUpdateEvent {
        user_id: Uuid::nil(),
        status: PresenceStatus::Online,
        username: "sample".into(),
        avatar: None,
    })
}

#[tokio::test]
async fn test_send_to_user_reaches_all_and_only_their_sessions() {
    let hub = local_hub();
    let alice = Uuid::new_v4();
    let (a1, mut ar1) = Session::open(alice);
    let (a2, mut ar2) = Session::open(alice);
    let (b1, mut br1) = Session::open(Uuid::new_v4());
    for session in [a1, a2, b1] {
        hub.registry().connect(session);
    }

    hub.send_to_user(alice, ServerEvent::Pong).await;

    assert_eq!(drain(&mut ar1).len(), 1);
    assert_eq!(drain(&mut ar2).len(), 1);
    assert!(drain(&mut br1).is_empty());
}

#[tokio::test]
async fn test_send_to_offline_user_is_dropped() {
    let hub = local_hub();
    let (other, mut rx) = Session::open(Uuid::new_v4());
    hub.registry().connect(other);

    hub.send_to_user(Uuid::new_v4(), ServerEvent::Pong).await;

    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_channel_broadcast_ignores_membership_and_uses_live_snapshot() {
    let hub = local_hub();
    let (stay, mut stay_rx) = Session::open(Uuid::new_v4());
    let (left, mut left_rx) = Session::open(Uuid::new_v4());
    hub.registry().connect(stay);
    hub.registry().connect(left.clone());
    hub.registry().disconnect(left.id(), left.user_id());

    hub.broadcast_to_channel("any-channel", ping_like()).await;

    let (late, mut late_rx) = Session::open(Uuid::new_v4());
    hub.registry().connect(late);

    assert_eq!(drain(&mut stay_rx).len(), 1);
    assert!(drain(&mut left_rx).is_empty());
    assert!(drain(&mut late_rx).is_empty());
}

#[tokio::test]
async fn test_failed_session_does_not_abort_fanout() {
    let hub = local_hub();
    let (dead, dead_rx) = Session::open(Uuid::new_v4());
    let (ok1, mut ok1_rx) = Session::open(Uuid::new_v4());
    let (ok2, mut ok2_rx) = Session::open(Uuid::new_v4());
    hub.registry().connect(ok1);
    hub.registry().connect(dead.clone());
    hub.registry().connect(ok2);
    drop(dead_rx);

    let report = deliver_locally(hub.registry(), &Scope::Everyone, &ping_like()).unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, vec![dead.id()]);
    assert_eq!(drain(&mut ok1_rx).len(), 1);
    assert_eq!(drain(&mut ok2_rx).len(), 1);
    // reaped by its own disconnect path, not by the fanout
    assert!(hub.is_online(dead.user_id()));
}

#[tokio::test]
async fn test_dm_to_offline_recipient_echoes_to_sender() {
    let hub = local_hub();
    let sender = profile("alice");
    let recipient = Uuid::new_v4();
    let (s1, mut s1_rx) = Session::open(sender.id);
    let (s2, mut s2_rx) = Session::open(sender.id);
    hub.registry().connect(s1);
    hub.registry().connect(s2);

    let dm = DirectMessage {
        id: Uuid::new_v4(),
        sender_id: sender.id,
        recipient_id: recipient,
        content: "are you there?".into(),
        reply_to_id: None,
        created_at: Utc::now(),
    };
    hub.send_direct_message(&dm, &sender).await;

    for rx in [&mut s1_rx, &mut s2_rx] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "dm");
        assert_eq!(frames[0]["recipient_id"], recipient.to_string());
        assert_eq!(frames[0]["user"], "alice");
        assert_eq!(frames[0]["sender_avatar"], "https://cdn.example.com/alice.png");
    }
}

#[tokio::test]
async fn test_rest_side_notifications() {
    let hub = local_hub();
    let sender = Uuid::new_v4();
    let recipient = Uuid::new_v4();
    let bystander = Uuid::new_v4();
    let (s, mut s_rx) = Session::open(sender);
    let (r, mut r_rx) = Session::open(recipient);
    let (b, mut b_rx) = Session::open(bystander);
    for session in [s, r, b] {
        hub.registry().connect(session);
    }

    let channel_id = Uuid::new_v4();
    let message_id = Uuid::new_v4();
    hub.notify_message_updated(message_id, channel_id, "edited").await;
    hub.notify_message_deleted(message_id, channel_id).await;
    hub.notify_dm_deleted(Uuid::new_v4(), sender, recipient).await;
    hub.notify_kicked(bystander, Uuid::new_v4(), None).await;
    hub.notify_timeout(bystander, Uuid::new_v4(), Utc::now(), Some("cool down".into()))
        .await;

    let sender_frames = drain(&mut s_rx);
    let recipient_frames = drain(&mut r_rx);
    let bystander_frames = drain(&mut b_rx);

    let update = of_type(&bystander_frames, "message_update");
    assert_eq!(update.len(), 1);
    assert_eq!(update[0]["content"], "edited");
    assert_eq!(update[0]["is_edited"], true);
    assert_eq!(of_type(&sender_frames, "message_delete").len(), 1);

    assert_eq!(of_type(&sender_frames, "dm_delete").len(), 1);
    assert_eq!(of_type(&recipient_frames, "dm_delete").len(), 1);
    assert!(of_type(&bystander_frames, "dm_delete").is_empty());

    assert_eq!(of_type(&bystander_frames, "kicked").len(), 1);
    assert_eq!(of_type(&bystander_frames, "timeout")[0]["reason"], "cool down");
    assert!(of_type(&sender_frames, "kicked").is_empty());
}
