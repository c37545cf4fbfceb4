//! Notification documents
//!
//! The per-recipient summary of chat activity that accumulated while the
//! recipient had no live connection. One entry per chat; the entry keeps the
//! latest sender and text plus a running unread count.

use serde::{Deserialize, Serialize};

use crate::shared::chat::{ChatType, UserId};

/// Pending activity for one chat
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationEntry {
    pub chat_id: i64,
    pub chat_type: ChatType,
    pub latest_sender: UserId,
    pub latest_message: String,
    pub total_messages_count: u32,
}

/// All pending activity for one recipient
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationDocument {
    #[serde(default)]
    pub notifications: Vec<NotificationEntry>,
}

impl NotificationDocument {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn entry(&self, chat_id: i64) -> Option<&NotificationEntry> {
        self.notifications.iter().find(|n| n.chat_id == chat_id)
    }

    /// Record one new message for `chat_id`.
    ///
    /// An existing entry gets its latest fields replaced and its count bumped;
    /// otherwise a new entry is appended with a count of one.
    pub fn record(&mut self, chat_id: i64, chat_type: ChatType, sender: UserId, text: &str) {
        match self.notifications.iter_mut().find(|n| n.chat_id == chat_id) {
            Some(entry) => {
                entry.latest_sender = sender;
                entry.latest_message = text.to_string();
                entry.total_messages_count = entry.total_messages_count.saturating_add(1);
            }
            None => self.notifications.push(NotificationEntry {
                chat_id,
                chat_type,
                latest_sender: sender,
                latest_message: text.to_string(),
                total_messages_count: 1,
            }),
        }
    }

    /// Replace the latest text of `chat_id` after an edit. Returns whether an
    /// entry was touched.
    pub fn apply_edit(&mut self, chat_id: i64, text: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.chat_id == chat_id) {
            Some(entry) if entry.latest_message != text => {
                entry.latest_message = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Mark `count` messages of `chat_id` as read. A count of zero, or one that
    /// reaches the total, drops the entry. Returns whether anything changed.
    pub fn mark_read(&mut self, chat_id: i64, count: u32) -> bool {
        let Some(index) = self.notifications.iter().position(|n| n.chat_id == chat_id) else {
            return false;
        };

        let entry = &mut self.notifications[index];
        if count == 0 || count >= entry.total_messages_count {
            self.notifications.remove(index);
        } else {
            entry.total_messages_count -= count;
        }
        true
    }
}
