/**
 * Notification Store
 *
 * Read-modify-write of per-recipient [`NotificationDocument`]s on top of a
 * [`Cache`]. Each operation reads the whole document, changes it in memory and
 * writes it back. Two concurrent writers for the same recipient can lose an
 * update; the cache offers no compare-and-set here and the document is a
 * summary, so that is accepted.
 */

use std::sync::Arc;

use crate::backend::cache::Cache;
use crate::backend::error::BackendError;
use crate::shared::chat::{ChatType, UserId};
use crate::shared::notification::NotificationDocument;

/// Cache key holding the notification document of `user_id`
pub fn notification_key(user_id: UserId) -> String {
    format!("notifications:{}", user_id)
}

/// Notification documents keyed by recipient
#[derive(Clone)]
pub struct NotificationStore {
    cache: Arc<dyn Cache>,
}

impl NotificationStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    async fn load(&self, recipient: UserId) -> Result<Option<NotificationDocument>, BackendError> {
        match self.cache.get(&notification_key(recipient)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, recipient: UserId, doc: &NotificationDocument) -> Result<(), BackendError> {
        let key = notification_key(recipient);
        if doc.is_empty() {
            self.cache.delete(&key).await?;
        } else {
            let raw = serde_json::to_string(doc)?;
            self.cache.set(&key, &raw, None).await?;
        }
        Ok(())
    }

    /// Record one undelivered message for `recipient`.
    ///
    /// A missing document is treated as empty. The entry for `chat_id` is
    /// updated in place (latest sender and text replaced, count incremented) or
    /// appended with a count of one.
    ///
    /// # Returns
    ///
    /// The document as written.
    pub async fn upsert(
        &self,
        recipient: UserId,
        chat_id: i64,
        chat_type: ChatType,
        sender: UserId,
        text: &str,
    ) -> Result<NotificationDocument, BackendError> {
        let mut doc = self.load(recipient).await?.unwrap_or_default();
        doc.record(chat_id, chat_type, sender, text);
        self.save(recipient, &doc).await?;

        tracing::debug!(
            recipient,
            chat_id,
            entries = doc.notifications.len(),
            "Notification document updated"
        );
        Ok(doc)
    }

    /// Fetch the document of `recipient`
    ///
    /// # Errors
    ///
    /// `BackendError::NotFound` when the recipient has no document.
    pub async fn read(&self, recipient: UserId) -> Result<NotificationDocument, BackendError> {
        self.load(recipient)
            .await?
            .ok_or_else(|| BackendError::not_found("no notifications for this user"))
    }

    /// Replace the latest text of `chat_id` after an edit reached an offline
    /// recipient. The unread count is left alone. Returns whether the document
    /// was changed (and written).
    pub async fn apply_edit(
        &self,
        recipient: UserId,
        chat_id: i64,
        text: &str,
    ) -> Result<bool, BackendError> {
        let Some(mut doc) = self.load(recipient).await? else {
            return Ok(false);
        };
        if !doc.apply_edit(chat_id, text) {
            return Ok(false);
        }
        self.save(recipient, &doc).await?;
        Ok(true)
    }

    /// Mark `count` messages of `chat_id` read for `recipient` (0 clears the
    /// entry). The cache key is removed once no entries remain.
    pub async fn mark_read(
        &self,
        recipient: UserId,
        chat_id: i64,
        count: u32,
    ) -> Result<NotificationDocument, BackendError> {
        let mut doc = self.read(recipient).await?;
        if doc.mark_read(chat_id, count) {
            self.save(recipient, &doc).await?;
        }
        Ok(doc)
    }
}
