//! Delivery integration tests
//!
//! Runs `ChatService` over the in-memory repository with a real hub and a
//! notification store on the memory cache, and checks who gets a live push
//! and who gets a notification.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use cmshub::backend::cache::MemoryCache;
use cmshub::backend::chat::{ChatRepository, ChatService, Delivery};
use cmshub::backend::error::BackendError;
use cmshub::backend::hub::Hub;
use cmshub::backend::notifications::NotificationStore;
use cmshub::shared::chat::{CreateGroupRequest, SendMessageRequest, UpdateMessageRequest};
use cmshub::shared::event::{ChatEvent, EventAction};

use common::InMemoryChatRepository;

struct Fixture {
    service: ChatService,
    repo: Arc<InMemoryChatRepository>,
    hub: Hub,
    store: NotificationStore,
}

fn fixture() -> Fixture {
    let (hub, _queue) = Hub::new(16, 16);
    let store = NotificationStore::new(Arc::new(MemoryCache::new()));
    let repo = Arc::new(InMemoryChatRepository::new());
    let service = ChatService::new(repo.clone(), Delivery::new(hub.clone(), store.clone()));
    Fixture {
        service,
        repo,
        hub,
        store,
    }
}

fn group(group_id: i64, message: &str) -> SendMessageRequest {
    SendMessageRequest {
        chat_id: None,
        chat_type: "group".to_string(),
        receiver: group_id,
        message: message.to_string(),
        message_type: "text".to_string(),
    }
}

async fn create_team(repo: &InMemoryChatRepository, creator: i64) -> i64 {
    repo.create_group(
        &CreateGroupRequest {
            name: "Team".to_string(),
            username: "team".to_string(),
            description: None,
        },
        creator,
    )
    .await
    .unwrap()
    .group_id
}

fn private(receiver: i64, message: &str) -> SendMessageRequest {
    SendMessageRequest {
        chat_id: None,
        chat_type: "private".to_string(),
        receiver,
        message: message.to_string(),
        message_type: "text".to_string(),
    }
}

async fn event(queue: &mut mpsc::Receiver<Bytes>) -> ChatEvent {
    let frame = tokio::time::timeout(Duration::from_secs(1), queue.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("queue closed");
    ChatEvent::from_slice(&frame).unwrap()
}

#[tokio::test]
async fn test_online_recipient_gets_live_push() {
    let f = fixture();
    let (_conn, mut queue) = f.hub.register(2).await;

    let response = f.service.send_message(1, &private(2, "hello")).await.unwrap();
    assert_eq!(response.pushed, vec![2]);
    assert!(response.queued.is_empty());

    let pushed = event(&mut queue).await;
    assert_eq!(pushed.action, EventAction::NewMessage);
    assert_eq!(pushed.property.chat_id, response.chat_id);
    assert_eq!(pushed.property.sender, 1);
    assert_eq!(pushed.property.message, "hello");
    assert!(queue.try_recv().is_err(), "exactly one frame per message");

    assert_matches!(f.store.read(2).await, Err(BackendError::NotFound { .. }));
}

#[tokio::test]
async fn test_offline_recipient_is_queued_and_counted() {
    let f = fixture();

    let first = f.service.send_message(1, &private(2, "one")).await.unwrap();
    assert_eq!(first.queued, vec![2]);

    let mut again = private(2, "two");
    again.chat_id = Some(first.chat_id);
    f.service.send_message(1, &again).await.unwrap();

    let doc = f.store.read(2).await.unwrap();
    assert_eq!(doc.notifications.len(), 1);
    let entry = doc.entry(first.chat_id).unwrap();
    assert_eq!(entry.total_messages_count, 2);
    assert_eq!(entry.latest_message, "two");
    assert_eq!(entry.latest_sender, 1);

    // The sender never gets a notification about their own message
    assert!(f.store.read(1).await.is_err());
}

#[tokio::test]
async fn test_reply_goes_back_to_creator() {
    let f = fixture();
    let (_conn, mut creator_queue) = f.hub.register(1).await;

    let opened = f.service.send_message(1, &private(2, "hi")).await.unwrap();
    let mut reply = private(1, "hi back");
    reply.chat_id = Some(opened.chat_id);

    let response = f.service.send_message(2, &reply).await.unwrap();
    assert_eq!(response.pushed, vec![1]);
    assert_eq!(event(&mut creator_queue).await.property.message, "hi back");
}

#[tokio::test]
async fn test_stranger_cannot_post_in_private_chat() {
    let f = fixture();
    let opened = f.service.send_message(1, &private(2, "hi")).await.unwrap();

    let mut intrusion = private(2, "psst");
    intrusion.chat_id = Some(opened.chat_id);
    let err = f.service.send_message(3, &intrusion).await.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(f.repo.message_count().await, 1);
}

#[tokio::test]
async fn test_group_fan_out_excludes_sender() {
    let f = fixture();
    let group = f
        .repo
        .create_group(
            &CreateGroupRequest {
                name: "Team".to_string(),
                username: "team".to_string(),
                description: None,
            },
            10,
        )
        .await
        .unwrap();
    for member in [11, 12, 13] {
        f.repo.add_user_to_group(group.group_id, member).await.unwrap();
    }

    let (_s, mut sender_queue) = f.hub.register(10).await;
    let (_a, mut online_a) = f.hub.register(11).await;
    let (_b, mut online_b) = f.hub.register(12).await;

    let request = SendMessageRequest {
        chat_id: None,
        chat_type: "group".to_string(),
        receiver: group.group_id,
        message: "standup".to_string(),
        message_type: "text".to_string(),
    };
    let response = f.service.send_message(10, &request).await.unwrap();

    assert_eq!(response.pushed, vec![11, 12]);
    assert_eq!(response.queued, vec![13]);
    assert_eq!(event(&mut online_a).await.property.receiver, group.group_id);
    assert_eq!(event(&mut online_b).await.property.message, "standup");
    assert!(sender_queue.try_recv().is_err());

    let doc = f.store.read(13).await.unwrap();
    assert_eq!(doc.entry(response.chat_id).unwrap().total_messages_count, 1);
    assert!(f.store.read(10).await.is_err());
}

#[tokio::test]
async fn test_group_message_to_missing_group_is_not_persisted() {
    let f = fixture();
    let request = SendMessageRequest {
        chat_id: None,
        chat_type: "group".to_string(),
        receiver: 404,
        message: "anyone?".to_string(),
        message_type: "text".to_string(),
    };

    let err = f.service.send_message(1, &request).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(f.repo.message_count().await, 0);
}

#[tokio::test]
async fn test_edit_updates_offline_notification_without_counting() {
    let f = fixture();
    let sent = f.service.send_message(1, &private(2, "tpyo")).await.unwrap();

    let updated = f
        .service
        .update_message(
            1,
            &UpdateMessageRequest {
                chat_id: sent.chat_id,
                message_id: sent.message_id,
                new_message: "typo".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.queued, vec![2]);

    let doc = f.store.read(2).await.unwrap();
    let entry = doc.entry(sent.chat_id).unwrap();
    assert_eq!(entry.latest_message, "typo");
    assert_eq!(entry.total_messages_count, 1);
}

#[tokio::test]
async fn test_edit_with_no_pending_entry_queues_nothing() {
    let f = fixture();
    let sent = f.service.send_message(1, &private(2, "hi")).await.unwrap();
    f.store.mark_read(2, sent.chat_id, 0).await.unwrap();

    let updated = f
        .service
        .update_message(
            1,
            &UpdateMessageRequest {
                chat_id: sent.chat_id,
                message_id: sent.message_id,
                new_message: "hello".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(updated.pushed.is_empty());
    assert!(updated.queued.is_empty());
    assert!(f.store.read(2).await.is_err());
}

#[tokio::test]
async fn test_delete_pushes_online_and_skips_offline() {
    let f = fixture();
    let sent = f.service.send_message(1, &private(2, "oops")).await.unwrap();

    let report = f.service.delete_message(1, sent.message_id).await.unwrap();
    assert!(report.pushed.is_empty());
    assert!(report.queued.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(f.repo.message_count().await, 0);

    // The earlier notification is left as it was
    let doc = f.store.read(2).await.unwrap();
    assert_eq!(doc.entry(sent.chat_id).unwrap().latest_message, "oops");

    let second = {
        let mut request = private(2, "again");
        request.chat_id = Some(sent.chat_id);
        f.service.send_message(1, &request).await.unwrap()
    };
    let (_conn, mut queue) = f.hub.register(2).await;
    let report = f.service.delete_message(1, second.message_id).await.unwrap();
    assert_eq!(report.pushed, vec![2]);
    assert_eq!(event(&mut queue).await.action, EventAction::DeleteMessage);
}

#[tokio::test]
async fn test_only_author_can_delete() {
    let f = fixture();
    let sent = f.service.send_message(1, &private(2, "mine")).await.unwrap();

    let err = f.service.delete_message(2, sent.message_id).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(f.repo.message_count().await, 1);
}

#[tokio::test]
async fn test_only_group_members_can_post() {
    let f = fixture();
    let group_id = create_team(&f.repo, 10).await;
    f.repo.add_user_to_group(group_id, 11).await.unwrap();

    // The creator is a member from the start
    assert_eq!(f.repo.group_members(group_id).await.unwrap(), vec![10, 11]);

    let opened = f.service.send_message(10, &group(group_id, "welcome")).await.unwrap();
    assert_eq!(opened.queued, vec![11]);

    let err = f.service.send_message(99, &group(group_id, "let me in")).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let mut into_existing = group(group_id, "still not in");
    into_existing.chat_id = Some(opened.chat_id);
    let err = f.service.send_message(99, &into_existing).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    assert_eq!(f.repo.message_count().await, 1);
    assert_eq!(f.repo.user_chats(99).await.unwrap(), Vec::new());
    let doc = f.store.read(11).await.unwrap();
    assert_eq!(doc.entry(opened.chat_id).unwrap().total_messages_count, 1);
}

#[tokio::test]
async fn test_member_who_left_cannot_post_but_can_edit() {
    let f = fixture();
    let group_id = create_team(&f.repo, 10).await;
    f.repo.add_user_to_group(group_id, 11).await.unwrap();

    let mut request = group(group_id, "first");
    let sent = f.service.send_message(11, &request).await.unwrap();
    f.repo.remove_user_from_group(group_id, 11).await.unwrap();

    request.chat_id = Some(sent.chat_id);
    let err = f.service.send_message(11, &request).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let updated = f
        .service
        .update_message(
            11,
            &UpdateMessageRequest {
                chat_id: sent.chat_id,
                message_id: sent.message_id,
                new_message: "first!".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.queued, vec![10]);
}
