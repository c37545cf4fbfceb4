/**
 * Router Configuration
 *
 * Combines the WebSocket route, the `/v1` API and the health check into one
 * router, wrapped in request tracing and CORS layers.
 */

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Create the Axum router with all routes configured
///
/// # Route Order
///
/// 1. **Health**: `GET /health`, no authentication
/// 2. **Chat Routes**: `GET /ws`
/// 3. **API Routes**: `/v1/...`
/// 4. **Fallback**: 404 JSON body
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));
    let router = configure_chat_routes(router);
    let router = configure_api_routes(router);

    router
        .fallback(|| async {
            (
                axum::http::StatusCode::NOT_FOUND,
                Json(crate::shared::chat::ResponseWithMessage {
                    message: "not found".to_string(),
                }),
            )
        })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
