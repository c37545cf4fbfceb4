/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every handler. It is
 * cheap to clone: every field is a handle around shared data.
 *
 * # Thread Safety
 *
 * - `Hub` wraps an `Arc<RwLock<..>>` registry
 * - `NotificationStore` and `ChatService` hold `Arc<dyn Trait + Send + Sync>`
 *   collaborators
 * - `CancellationToken` is shared with the broadcast worker and every session
 *
 * # State Extraction
 *
 * `FromRef` lets handlers that only need one part of the state extract it
 * directly:
 *
 * ```rust,ignore
 * async fn handler(State(hub): State<Hub>) {
 *     let online = hub.connection_count().await;
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use tokio_util::sync::CancellationToken;

use crate::backend::chat::{ChatRepository, ChatService, Delivery};
use crate::backend::error::BackendError;
use crate::backend::hub::Hub;
use crate::backend::notifications::NotificationStore;
use crate::shared::config::HubConfig;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Registry of live WebSocket sessions
    pub hub: Hub,

    /// Notification documents for offline recipients
    pub notifications: NotificationStore,

    /// Chat operations; `None` when no database is configured
    pub chat: Option<ChatService>,

    /// Secret used to verify bearer tokens
    pub jwt_secret: Arc<str>,

    /// Per-session tuning
    pub hub_config: HubConfig,

    /// Cancelled on shutdown; ends the broadcast worker and open sessions
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        hub: Hub,
        notifications: NotificationStore,
        repo: Option<Arc<dyn ChatRepository>>,
        jwt_secret: impl Into<Arc<str>>,
        hub_config: HubConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let delivery = Delivery::new(hub.clone(), notifications.clone());
        let chat = repo.map(|repo| ChatService::new(repo, delivery));
        Self {
            hub,
            notifications,
            chat,
            jwt_secret: jwt_secret.into(),
            hub_config,
            shutdown,
        }
    }

    /// Chat service, or 503 when the database is not configured
    pub fn chat(&self) -> Result<&ChatService, BackendError> {
        self.chat
            .as_ref()
            .ok_or_else(|| BackendError::unavailable("chat storage is not configured"))
    }
}

impl FromRef<AppState> for Hub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

impl FromRef<AppState> for NotificationStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifications.clone()
    }
}
