/**
 * API Route Handlers
 *
 * Versioned REST endpoints. All of them require a bearer token.
 *
 * ## Groups
 * - `POST /v1/group`, `PUT /v1/group`
 * - `GET|PATCH|DELETE /v1/group/{id}`
 * - `GET /v1/group/user-groups/{id}`
 * - `POST|DELETE /v1/group/{id}/users/{user_id}`
 *
 * ## Chats and messages
 * - `GET /v1/user-chats/{id}`, `DELETE /v1/chat/{id}`
 * - `POST /v1/send-message`, `PUT /v1/update-message`
 * - `DELETE /v1/delete-message/{id}`, `GET /v1/chat-messages/{id}`
 *
 * ## Notifications
 * - `GET /v1/get-notifications/{id}`
 * - `DELETE /v1/chat-notifications?chat_id=&user_id=&count=`
 */

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::backend::chat::handlers::{groups, messages, notifications};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Groups
        .route(
            "/v1/group",
            post(groups::create_group).put(groups::update_group),
        )
        .route(
            "/v1/group/{id}",
            get(groups::get_group)
                .patch(groups::update_group_columns)
                .delete(groups::delete_group),
        )
        .route("/v1/group/user-groups/{id}", get(groups::user_groups))
        .route(
            "/v1/group/{id}/users/{user_id}",
            post(groups::add_member).delete(groups::remove_member),
        )
        // Chats
        .route("/v1/user-chats/{id}", get(messages::user_chats))
        .route("/v1/chat/{id}", delete(messages::delete_chat))
        // Messages
        .route("/v1/send-message", post(messages::send_message))
        .route("/v1/update-message", put(messages::update_message))
        .route("/v1/delete-message/{id}", delete(messages::delete_message))
        .route("/v1/chat-messages/{id}", get(messages::chat_messages))
        // Notifications
        .route(
            "/v1/get-notifications/{id}",
            get(notifications::get_notifications),
        )
        .route(
            "/v1/chat-notifications",
            delete(notifications::mark_read),
        )
}
