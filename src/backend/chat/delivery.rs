/**
 * Message Delivery
 *
 * Pushes one chat event to a set of recipients. For each recipient the
 * serialized event goes to every live connection it has in the hub; if none
 * accepts it, the recipient's notification document is updated instead:
 *
 * | Action           | Offline recipient                             |
 * |------------------|-----------------------------------------------|
 * | `new_message`    | entry upserted, unread count incremented      |
 * | `update_message` | latest text replaced if the entry exists      |
 * | `delete_message` | nothing                                       |
 *
 * Recipients are handled one after another with no ordering guarantee across
 * them and no rollback. A fallback failure for one recipient is logged and
 * reported; the remaining recipients are still served.
 */

use crate::backend::error::BackendError;
use crate::backend::hub::Hub;
use crate::backend::notifications::NotificationStore;
use crate::shared::chat::UserId;
use crate::shared::event::{ChatEvent, EventAction};

/// Outcome of a fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients reached over at least one live connection
    pub pushed: Vec<UserId>,
    /// Offline recipients whose notification document was written
    pub queued: Vec<UserId>,
    /// Offline recipients whose fallback write failed
    pub failed: Vec<UserId>,
}

/// Live-push-or-fallback delivery of chat events
#[derive(Clone)]
pub struct Delivery {
    hub: Hub,
    notifications: NotificationStore,
}

impl Delivery {
    pub fn new(hub: Hub, notifications: NotificationStore) -> Self {
        Self { hub, notifications }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Deliver `event` to each of `targets`.
    ///
    /// # Errors
    ///
    /// Only a failure to serialize the event is returned, before anything is
    /// sent. Per-recipient fallback failures land in
    /// [`DeliveryReport::failed`].
    pub async fn deliver(&self, targets: &[UserId], event: &ChatEvent) -> Result<DeliveryReport, BackendError> {
        let frame = event.to_bytes()?;
        let mut report = DeliveryReport::default();

        for &target in targets {
            let delivered = self.hub.send_to(target, frame.clone()).await;
            if delivered > 0 {
                tracing::debug!(target, connections = delivered, action = ?event.action, "Event pushed");
                report.pushed.push(target);
                continue;
            }

            match self.fallback(target, event).await {
                Ok(true) => report.queued.push(target),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(target, error = %e, "Notification fallback failed");
                    report.failed.push(target);
                }
            }
        }

        tracing::info!(
            chat_id = event.property.chat_id,
            action = ?event.action,
            pushed = report.pushed.len(),
            queued = report.queued.len(),
            failed = report.failed.len(),
            "Delivery finished"
        );
        Ok(report)
    }

    async fn fallback(&self, target: UserId, event: &ChatEvent) -> Result<bool, BackendError> {
        let property = &event.property;
        match event.action {
            EventAction::NewMessage => {
                self.notifications
                    .upsert(
                        target,
                        property.chat_id,
                        property.chat_type,
                        property.sender,
                        &property.message,
                    )
                    .await?;
                Ok(true)
            }
            EventAction::UpdateMessage => {
                self.notifications
                    .apply_edit(target, property.chat_id, &property.message)
                    .await
            }
            EventAction::DeleteMessage => Ok(false),
        }
    }
}
