/**
 * Server Initialization
 *
 * Builds the application from an [`AppConfig`]:
 *
 * 1. Connect the database (optional) and the cache (falls back to memory)
 * 2. Create the hub and start its broadcast worker
 * 3. Assemble `AppState` and the router
 */

use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::chat::{ChatRepository, PgChatRepository};
use crate::backend::hub::{spawn_broadcast_worker, Hub};
use crate::backend::notifications::NotificationStore;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_cache, load_database};
use crate::backend::server::state::AppState;
use crate::shared::config::{AppConfig, ConfigError};

/// A configured application and the handles needed to stop it
pub struct App {
    /// Router ready to serve
    pub router: Router<()>,
    /// Shared state, also reachable from the router
    pub state: AppState,
    /// Cancel to stop the broadcast worker and close open sessions
    pub shutdown: CancellationToken,
    /// The broadcast worker task
    pub worker: JoinHandle<()>,
}

impl App {
    /// Cancel the shutdown token and wait for the broadcast worker
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.worker.await {
            tracing::error!("Broadcast worker panicked: {}", e);
        }
    }
}

/// Create and configure the Axum application
///
/// # Error Handling
///
/// Only an invalid configuration is an error. Missing collaborators are
/// logged and degraded around.
pub async fn create_app(config: &AppConfig) -> Result<App, ConfigError> {
    config.validate()?;
    tracing::info!("Initializing cmshub server");

    // Step 1: Collaborators
    let repo = load_database(&config.database)
        .await
        .map(|pool| Arc::new(PgChatRepository::new(pool)) as Arc<dyn ChatRepository>);
    let cache = load_cache(&config.cache).await;

    // Step 2: Hub and broadcast worker
    let shutdown = CancellationToken::new();
    let (state, worker) = build_state(
        repo,
        NotificationStore::new(cache),
        config,
        shutdown.clone(),
    );

    // Step 3: Router
    let router = create_router(state.clone());
    tracing::info!("Router configured");

    Ok(App {
        router,
        state,
        shutdown,
        worker,
    })
}

/// Create the hub, start its broadcast worker and assemble the state around
/// the given collaborators
pub fn build_state(
    repo: Option<Arc<dyn ChatRepository>>,
    notifications: NotificationStore,
    config: &AppConfig,
    shutdown: CancellationToken,
) -> (AppState, JoinHandle<()>) {
    let (hub, broadcast_queue) = Hub::new(config.hub.queue_capacity, config.hub.broadcast_capacity);
    let worker = spawn_broadcast_worker(hub.clone(), broadcast_queue, shutdown.clone());

    let state = AppState::new(
        hub,
        notifications,
        repo,
        config.auth.jwt_secret.as_str(),
        config.hub.clone(),
        shutdown,
    );
    (state, worker)
}
