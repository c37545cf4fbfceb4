/**
 * Chat and Message Handlers
 *
 * - `GET /v1/user-chats/{id}` - chats a user takes part in
 * - `DELETE /v1/chat/{id}` - soft delete a chat
 * - `POST /v1/send-message` - persist and deliver a new message
 * - `PUT /v1/update-message` - edit and deliver
 * - `DELETE /v1/delete-message/{id}` - soft delete and deliver
 * - `GET /v1/chat-messages/{id}` - messages of a chat, oldest first
 *
 * The sender is always the authenticated caller, never a body field.
 */

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::backend::server::state::AppState;
use crate::shared::chat::{
    Chat, Message, ResponseWithMessage, SendMessageRequest, SendMessageResponse,
    UpdateMessageRequest, UserId,
};

pub async fn user_chats(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<Chat>>, BackendError> {
    Ok(Json(state.chat()?.repo().user_chats(user_id).await?))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(chat_id): ApiPath<i64>,
) -> Result<Json<ResponseWithMessage>, BackendError> {
    state.chat()?.repo().delete_chat(chat_id).await?;
    Ok(Json(ResponseWithMessage::success()))
}

pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(sender): AuthUser,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), BackendError> {
    let response = state.chat()?.send_message(sender, &request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_message(
    State(state): State<AppState>,
    AuthUser(sender): AuthUser,
    ApiJson(request): ApiJson<UpdateMessageRequest>,
) -> Result<Json<SendMessageResponse>, BackendError> {
    Ok(Json(state.chat()?.update_message(sender, &request).await?))
}

pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(sender): AuthUser,
    ApiPath(message_id): ApiPath<i64>,
) -> Result<Json<ResponseWithMessage>, BackendError> {
    state.chat()?.delete_message(sender, message_id).await?;
    Ok(Json(ResponseWithMessage::success()))
}

pub async fn chat_messages(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(chat_id): ApiPath<i64>,
) -> Result<Json<Vec<Message>>, BackendError> {
    Ok(Json(state.chat()?.repo().chat_messages(chat_id).await?))
}
