/**
 * Chat Service
 *
 * Glue between the REST handlers, the repository and delivery: persists a
 * message, works out who should receive the resulting event and hands it to
 * [`Delivery`].
 *
 * # Targets
 *
 * - Private chat: the other participant. The creator's counterpart is the
 *   stored receiver and the other way round.
 * - Group chat: every active member of the group except the sender. Only
 *   members may post; edits and deletes of earlier posts still fan out
 *   after the author has left.
 *
 * Creating a chat and posting its first message are two separate
 * statements; a failure in between leaves an empty chat behind.
 */

use std::sync::Arc;

use axum::http::StatusCode;

use crate::backend::chat::delivery::{Delivery, DeliveryReport};
use crate::backend::chat::repository::ChatRepository;
use crate::backend::error::BackendError;
use crate::shared::chat::{
    Chat, ChatType, Message, NewMessage, SendMessageRequest, SendMessageResponse,
    UpdateMessageRequest, UserId,
};
use crate::shared::event::{ChatEvent, EventAction};

/// Chat operations that produce events
#[derive(Clone)]
pub struct ChatService {
    repo: Arc<dyn ChatRepository>,
    delivery: Delivery,
}

impl ChatService {
    pub fn new(repo: Arc<dyn ChatRepository>, delivery: Delivery) -> Self {
        Self { repo, delivery }
    }

    pub fn repo(&self) -> &dyn ChatRepository {
        self.repo.as_ref()
    }

    /// Recipients of an event `sender` caused in `chat`
    pub async fn resolve_targets(&self, chat: &Chat, sender: UserId) -> Result<Vec<UserId>, BackendError> {
        match chat.chat_type {
            ChatType::Private => {
                if sender == chat.creator {
                    Ok(vec![chat.receiver_id])
                } else if sender == chat.receiver_id {
                    Ok(vec![chat.creator])
                } else {
                    Err(BackendError::handler(
                        StatusCode::FORBIDDEN,
                        "sender is not a participant of this chat",
                    ))
                }
            }
            ChatType::Group => {
                let members = self.repo.group_members(chat.receiver_id).await?;
                Ok(members.into_iter().filter(|member| *member != sender).collect())
            }
        }
    }

    /// Post a message, opening a new chat when the request names none
    pub async fn send_message(
        &self,
        sender: UserId,
        request: &SendMessageRequest,
    ) -> Result<SendMessageResponse, BackendError> {
        let chat_type = request.validate()?;

        let chat = match request.existing_chat() {
            Some(chat_id) => {
                let chat = self.repo.get_chat(chat_id).await?;
                if chat.chat_type != chat_type {
                    return Err(BackendError::bad_request("chat type does not match the chat"));
                }
                if chat_type == ChatType::Group {
                    self.ensure_member(chat.receiver_id, sender).await?;
                }
                chat
            }
            None => {
                if chat_type == ChatType::Group {
                    self.repo.get_group(request.receiver).await?;
                    self.ensure_member(request.receiver, sender).await?;
                }
                self.repo.create_chat(sender, chat_type, request.receiver).await?
            }
        };

        let targets = self.resolve_targets(&chat, sender).await?;
        let message = self
            .repo
            .create_message(&NewMessage {
                chat_id: chat.chat_id,
                sender,
                content: request.message.clone(),
                message_type: request.message_type.clone(),
            })
            .await?;

        let report = self.publish(EventAction::NewMessage, &chat, &message, &targets).await?;
        Ok(response(&chat, &message, report))
    }

    /// Edit a message the caller posted
    pub async fn update_message(
        &self,
        sender: UserId,
        request: &UpdateMessageRequest,
    ) -> Result<SendMessageResponse, BackendError> {
        if request.new_message.trim().is_empty() {
            return Err(BackendError::bad_request("message cannot be empty"));
        }

        let chat = self.repo.get_chat(request.chat_id).await?;
        let message = self
            .repo
            .update_message(request.message_id, chat.chat_id, sender, &request.new_message)
            .await?;

        let targets = self.resolve_targets(&chat, sender).await?;
        let report = self.publish(EventAction::UpdateMessage, &chat, &message, &targets).await?;
        Ok(response(&chat, &message, report))
    }

    /// Soft-delete a message the caller posted
    pub async fn delete_message(&self, sender: UserId, message_id: i64) -> Result<DeliveryReport, BackendError> {
        let message = self.repo.delete_message(message_id, sender).await?;
        let chat = self.repo.get_chat(message.chat_id).await?;

        let targets = self.resolve_targets(&chat, sender).await?;
        self.publish(EventAction::DeleteMessage, &chat, &message, &targets).await
    }

    async fn ensure_member(&self, group_id: i64, user: UserId) -> Result<(), BackendError> {
        if self.repo.group_members(group_id).await?.contains(&user) {
            Ok(())
        } else {
            tracing::warn!(group_id, user, "Post from outside the group rejected");
            Err(BackendError::handler(
                StatusCode::FORBIDDEN,
                "sender is not a member of this group",
            ))
        }
    }

    async fn publish(
        &self,
        action: EventAction,
        chat: &Chat,
        message: &Message,
        targets: &[UserId],
    ) -> Result<DeliveryReport, BackendError> {
        let event = ChatEvent::new(action, chat, message);
        self.delivery.deliver(targets, &event).await
    }
}

fn response(chat: &Chat, message: &Message, report: DeliveryReport) -> SendMessageResponse {
    SendMessageResponse {
        chat_id: chat.chat_id,
        message_id: message.message_id,
        pushed: report.pushed,
        queued: report.queued,
    }
}
