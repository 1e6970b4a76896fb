/**
 * Notification Dispatcher
 *
 * Persists notifications under `users/{uid}/notifications` and pushes them
 * to the recipient's device.
 *
 * # Two-Phase Delivery
 *
 * Workflows stage notifications into the same `WriteBatch` as the state
 * change that caused them, so a notification exists if and only if the change
 * committed. The returned `PendingPush` values are handed to
 * [`NotificationDispatcher::deliver`] after the commit. Push is best effort:
 * failures are logged and never reach the caller.
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;

use super::push::{PushMessage, PushSender};
use crate::backend::store::{get_as, new_document_id, DocumentStore, Patch, StoreError, WriteBatch};
use crate::shared::collections::{self, user_sub};
use crate::shared::{Notification, NotificationPriority, NotificationType, UserProfile};

/// A notification to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient: String,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub item_id: Option<String>,
    pub item_title: Option<String>,
    pub swap_id: Option<String>,
    pub order_id: Option<String>,
    pub priority: NotificationPriority,
    pub data: Option<Value>,
}

impl NewNotification {
    pub fn new(
        recipient: impl Into<String>,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            kind,
            title: title.into(),
            message: message.into(),
            item_id: None,
            item_title: None,
            swap_id: None,
            order_id: None,
            priority: NotificationPriority::default(),
            data: None,
        }
    }

    pub fn item(mut self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.item_id = Some(id.into());
        self.item_title = Some(title.into());
        self
    }

    pub fn swap(mut self, id: impl Into<String>) -> Self {
        self.swap_id = Some(id.into());
        self
    }

    pub fn order(mut self, id: impl Into<String>) -> Self {
        self.order_id = Some(id.into());
        self
    }

    pub fn priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    fn to_document(&self) -> Notification {
        Notification {
            id: String::new(),
            kind: self.kind.clone(),
            title: self.title.clone(),
            message: self.message.clone(),
            item_id: self.item_id.clone(),
            item_title: self.item_title.clone(),
            swap_id: self.swap_id.clone(),
            order_id: self.order_id.clone(),
            priority: self.priority,
            data: self.data.clone(),
            is_read: false,
            timestamp: None,
        }
    }

    fn to_push(&self, token: String) -> PushMessage {
        let mut data = BTreeMap::new();
        data.insert("type".to_string(), self.kind.as_str().to_string());
        data.insert("itemId".to_string(), self.item_id.clone().unwrap_or_default());
        data.insert("swapId".to_string(), self.swap_id.clone().unwrap_or_default());
        PushMessage {
            token,
            title: self.title.clone(),
            body: self.message.clone(),
            data,
        }
    }
}

/// A committed notification waiting for its push
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPush {
    pub id: String,
    pub notification: NewNotification,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn DocumentStore>,
    push: Arc<dyn PushSender>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, push: Arc<dyn PushSender>) -> Self {
        Self { store, push }
    }

    /// Add the notification document to a batch
    pub fn stage(batch: &mut WriteBatch, notification: NewNotification) -> Result<PendingPush, StoreError> {
        let id = new_document_id();
        let patch = Patch::from_document(&notification.to_document())?.server_timestamp("timestamp");
        batch.create(
            user_sub(&notification.recipient, collections::NOTIFICATIONS),
            id.clone(),
            patch,
        );
        Ok(PendingPush { id, notification })
    }

    /// Push committed notifications to their recipients' devices
    pub async fn deliver(&self, pending: &[PendingPush]) {
        join_all(pending.iter().map(|p| self.push_one(p))).await;
    }

    /// Persist and push a single notification; returns its id
    pub async fn send(&self, notification: NewNotification) -> Result<String, StoreError> {
        let mut batch = WriteBatch::new();
        let pending = Self::stage(&mut batch, notification)?;
        self.store.commit(batch).await?;
        self.deliver(std::slice::from_ref(&pending)).await;
        Ok(pending.id)
    }

    async fn push_one(&self, pending: &PendingPush) {
        let recipient = &pending.notification.recipient;
        let profile = match get_as::<UserProfile>(self.store.as_ref(), collections::USERS, recipient).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(recipient = %recipient, "Could not load push target: {}", e);
                return;
            }
        };

        let Some(token) = profile.fcm_token.clone().filter(|t| !t.is_empty()) else {
            return;
        };
        if !profile.notification_settings().push_notifications {
            tracing::debug!(recipient = %recipient, "Push disabled in settings");
            return;
        }

        let message = pending.notification.to_push(token);
        if let Err(e) = self.push.send(&message).await {
            tracing::warn!(
                recipient = %recipient,
                notification = %pending.id,
                "Push delivery failed: {}",
                e
            );
        }
    }
}
