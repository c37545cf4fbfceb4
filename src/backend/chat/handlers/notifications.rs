/**
 * Notification Handlers
 *
 * - `GET /v1/get-notifications/{id}` - the user's notification document
 * - `DELETE /v1/chat-notifications?chat_id=&user_id=&count=` - mark messages read
 *
 * These only need the cache, so they keep working without a database.
 */

use axum::extract::State;
use axum::Json;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiPath, ApiQuery, AuthUser};
use crate::backend::notifications::NotificationStore;
use crate::shared::chat::{MarkReadQuery, UserId};
use crate::shared::notification::NotificationDocument;

pub async fn get_notifications(
    State(store): State<NotificationStore>,
    _user: AuthUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<NotificationDocument>, BackendError> {
    Ok(Json(store.read(user_id).await?))
}

pub async fn mark_read(
    State(store): State<NotificationStore>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<MarkReadQuery>,
) -> Result<Json<NotificationDocument>, BackendError> {
    let doc = store
        .mark_read(query.user_id, query.chat_id, query.count)
        .await?;
    Ok(Json(doc))
}
