//! Common test utilities and helpers
//!
//! - `InMemoryChatRepository`: a `ChatRepository` with the same soft-delete
//!   semantics as the Postgres one, so the API can be driven without a database
//! - token helpers for the bearer auth
//! - `TestApp`: router plus state built around the in-memory collaborators

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use cmshub::backend::cache::MemoryCache;
use cmshub::backend::chat::repository::validate_group_columns;
use cmshub::backend::chat::ChatRepository;
use cmshub::backend::error::BackendError;
use cmshub::backend::notifications::NotificationStore;
use cmshub::backend::routes::create_router;
use cmshub::backend::server::{build_state, AppState};
use cmshub::shared::chat::{
    Chat, ChatType, CreateGroupRequest, Group, Message, NewMessage, UpdateGroupRequest, UserId,
};
use cmshub::shared::config::AppConfig;

pub const TEST_SECRET: &str = "test-secret";

/// Sign a token for `user_id` with `secret`, valid for an hour
pub fn token_with_secret(user_id: UserId, secret: &str) -> String {
    let exp = (Utc::now().timestamp() + 3600) as usize;
    encode(
        &Header::default(),
        &json!({ "sub": user_id, "exp": exp }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

pub fn token(user_id: UserId) -> String {
    token_with_secret(user_id, TEST_SECRET)
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    groups: BTreeMap<i64, (Group, bool)>,
    members: BTreeMap<(i64, UserId), bool>,
    chats: BTreeMap<i64, (Chat, bool)>,
    messages: BTreeMap<i64, (Message, bool)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn active_group(&mut self, group_id: i64) -> Result<&mut Group, BackendError> {
        match self.groups.get_mut(&group_id) {
            Some((group, false)) => Ok(group),
            _ => Err(BackendError::not_found(format!("group {} not found", group_id))),
        }
    }
}

/// `ChatRepository` backed by maps; the bool next to each row is its
/// soft-delete flag
#[derive(Default)]
pub struct InMemoryChatRepository {
    tables: Mutex<Tables>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn message_count(&self) -> usize {
        let tables = self.tables.lock().await;
        tables.messages.values().filter(|(_, deleted)| !deleted).count()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn user_groups(&self, user_id: UserId) -> Result<Vec<Group>, BackendError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .members
            .iter()
            .filter(|((_, member), active)| **active && *member == user_id)
            .filter_map(|((group_id, _), _)| match tables.groups.get(group_id) {
                Some((group, false)) => Some(group.clone()),
                _ => None,
            })
            .collect())
    }

    async fn get_group(&self, group_id: i64) -> Result<Group, BackendError> {
        let mut tables = self.tables.lock().await;
        tables.active_group(group_id).map(|group| group.clone())
    }

    async fn create_group(
        &self,
        request: &CreateGroupRequest,
        created_by: UserId,
    ) -> Result<Group, BackendError> {
        let mut tables = self.tables.lock().await;
        let group = Group {
            group_id: tables.next_id(),
            name: request.name.clone(),
            username: request.username.clone(),
            description: request.description.clone(),
            created_by,
        };
        tables.groups.insert(group.group_id, (group.clone(), false));
        tables.members.insert((group.group_id, created_by), true);
        Ok(group)
    }

    async fn update_group(
        &self,
        request: &UpdateGroupRequest,
        _updated_by: UserId,
    ) -> Result<Group, BackendError> {
        let mut tables = self.tables.lock().await;
        let group = tables.active_group(request.group_id)?;
        group.name = request.name.clone();
        group.username = request.username.clone();
        group.description = request.description.clone();
        Ok(group.clone())
    }

    async fn update_group_columns(
        &self,
        group_id: i64,
        fields: &HashMap<String, String>,
        _updated_by: UserId,
    ) -> Result<Group, BackendError> {
        let columns = validate_group_columns(fields)?;
        let mut tables = self.tables.lock().await;
        let group = tables.active_group(group_id)?;
        for (column, value) in columns {
            match column {
                "name" => group.name = value,
                "username" => group.username = value,
                "description" => group.description = Some(value),
                _ => unreachable!("column list is whitelisted"),
            }
        }
        Ok(group.clone())
    }

    async fn delete_group(&self, group_id: i64, _deleted_by: UserId) -> Result<(), BackendError> {
        let mut tables = self.tables.lock().await;
        tables.active_group(group_id)?;
        if let Some(row) = tables.groups.get_mut(&group_id) {
            row.1 = true;
        }
        Ok(())
    }

    async fn add_user_to_group(&self, group_id: i64, user_id: UserId) -> Result<(), BackendError> {
        let mut tables = self.tables.lock().await;
        tables.active_group(group_id)?;
        tables.members.insert((group_id, user_id), true);
        Ok(())
    }

    async fn remove_user_from_group(&self, group_id: i64, user_id: UserId) -> Result<(), BackendError> {
        let mut tables = self.tables.lock().await;
        match tables.members.get_mut(&(group_id, user_id)) {
            Some(active) if *active => {
                *active = false;
                Ok(())
            }
            _ => Err(BackendError::not_found("membership not found")),
        }
    }

    async fn group_members(&self, group_id: i64) -> Result<Vec<UserId>, BackendError> {
        let mut tables = self.tables.lock().await;
        if tables.active_group(group_id).is_err() {
            return Ok(Vec::new());
        }
        Ok(tables
            .members
            .iter()
            .filter(|((group, _), active)| **active && *group == group_id)
            .map(|((_, member), _)| *member)
            .collect())
    }

    async fn create_chat(
        &self,
        creator: UserId,
        chat_type: ChatType,
        receiver_id: i64,
    ) -> Result<Chat, BackendError> {
        let mut tables = self.tables.lock().await;
        let chat = Chat {
            chat_id: tables.next_id(),
            chat_type,
            creator,
            receiver_id,
            created_at: Utc::now(),
        };
        tables.chats.insert(chat.chat_id, (chat.clone(), false));
        Ok(chat)
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Chat, BackendError> {
        let tables = self.tables.lock().await;
        match tables.chats.get(&chat_id) {
            Some((chat, false)) => Ok(chat.clone()),
            _ => Err(BackendError::not_found(format!("chat {} not found", chat_id))),
        }
    }

    async fn delete_chat(&self, chat_id: i64) -> Result<(), BackendError> {
        let mut tables = self.tables.lock().await;
        match tables.chats.get_mut(&chat_id) {
            Some(row) if !row.1 => {
                row.1 = true;
                Ok(())
            }
            _ => Err(BackendError::not_found(format!("chat {} not found", chat_id))),
        }
    }

    async fn user_chats(&self, user_id: UserId) -> Result<Vec<Chat>, BackendError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .chats
            .values()
            .filter(|(_, deleted)| !deleted)
            .map(|(chat, _)| chat)
            .filter(|chat| {
                chat.creator == user_id
                    || match chat.chat_type {
                        ChatType::Private => chat.receiver_id == user_id,
                        ChatType::Group => tables
                            .members
                            .get(&(chat.receiver_id, user_id))
                            .copied()
                            .unwrap_or(false),
                    }
            })
            .cloned()
            .collect())
    }

    async fn create_message(&self, message: &NewMessage) -> Result<Message, BackendError> {
        let mut tables = self.tables.lock().await;
        let row = Message {
            message_id: tables.next_id(),
            chat_id: message.chat_id,
            sender: message.sender,
            content: message.content.clone(),
            message_type: message.message_type.clone(),
            send_time: Utc::now(),
        };
        tables.messages.insert(row.message_id, (row.clone(), false));
        Ok(row)
    }

    async fn update_message(
        &self,
        message_id: i64,
        chat_id: i64,
        sender: UserId,
        content: &str,
    ) -> Result<Message, BackendError> {
        let mut tables = self.tables.lock().await;
        match tables.messages.get_mut(&message_id) {
            Some((message, false)) if message.chat_id == chat_id && message.sender == sender => {
                message.content = content.to_string();
                Ok(message.clone())
            }
            _ => Err(BackendError::not_found(format!("message {} not found", message_id))),
        }
    }

    async fn delete_message(&self, message_id: i64, sender: UserId) -> Result<Message, BackendError> {
        let mut tables = self.tables.lock().await;
        match tables.messages.get_mut(&message_id) {
            Some((message, deleted)) if !*deleted && message.sender == sender => {
                *deleted = true;
                Ok(message.clone())
            }
            _ => Err(BackendError::not_found(format!("message {} not found", message_id))),
        }
    }

    async fn chat_messages(&self, chat_id: i64) -> Result<Vec<Message>, BackendError> {
        self.get_chat(chat_id).await?;
        let tables = self.tables.lock().await;
        let mut messages: Vec<Message> = tables
            .messages
            .values()
            .filter(|(message, deleted)| !deleted && message.chat_id == chat_id)
            .map(|(message, _)| message.clone())
            .collect();
        messages.sort_by_key(|m| (m.send_time, m.message_id));
        Ok(messages)
    }
}

/// Router and state around in-memory collaborators
pub struct TestApp {
    pub router: Router<()>,
    pub state: AppState,
    pub repo: Option<Arc<InMemoryChatRepository>>,
    pub shutdown: CancellationToken,
    pub worker: JoinHandle<()>,
}

impl TestApp {
    /// With an in-memory repository
    pub fn new() -> Self {
        Self::build(Some(Arc::new(InMemoryChatRepository::new())))
    }

    /// Without a repository, as when no database is configured
    pub fn without_database() -> Self {
        Self::build(None)
    }

    fn build(repo: Option<Arc<InMemoryChatRepository>>) -> Self {
        let config = AppConfig::builder()
            .jwt_secret(TEST_SECRET)
            .build()
            .expect("Failed to build test config");
        let shutdown = CancellationToken::new();
        let notifications = NotificationStore::new(Arc::new(MemoryCache::new()));
        let (state, worker) = build_state(
            repo.clone().map(|r| r as Arc<dyn ChatRepository>),
            notifications,
            &config,
            shutdown.clone(),
        );
        let router = create_router(state.clone());

        Self {
            router,
            state,
            repo,
            shutdown,
            worker,
        }
    }
}
