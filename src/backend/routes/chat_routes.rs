/**
 * Chat Route Handlers
 *
 * - `GET /ws` - WebSocket session; the token comes from `?token=` or the
 *   `Authorization` header
 */

use axum::routing::get;
use axum::Router;

use crate::backend::server::state::AppState;
use crate::backend::ws::ws_handler;

/// Configure realtime routes
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/ws", get(ws_handler))
}
