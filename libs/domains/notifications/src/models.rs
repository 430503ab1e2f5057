//! Notification aggregate.

use chrono::{DateTime, Utc};
use event_sourcing::{Aggregate, Entity, EventMeta};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::NotificationError;
use crate::events::NotificationEvent;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Unread,
    Read,
}

/// Relational snapshot of a notification.
#[derive(Debug, Clone)]
pub struct NotificationSnapshot {
    pub entity_id: String,
    pub title: String,
    pub content: String,
    pub status: NotificationStatus,
    pub receiver: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The Notification aggregate root.
#[derive(Debug, Clone)]
pub struct Notification {
    entity: Entity<NotificationEvent>,
    title: String,
    content: String,
    status: NotificationStatus,
    receiver: String,
}

impl Notification {
    /// Create a new notification in UNREAD and record `NotificationCreated`.
    pub fn new(
        entity_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        receiver: impl Into<String>,
    ) -> Self {
        let mut notification = Self {
            entity: Entity::new(entity_id),
            title: title.into(),
            content: content.into(),
            status: NotificationStatus::Unread,
            receiver: receiver.into(),
        };
        let created = NotificationEvent::Created {
            meta: EventMeta::new(notification.entity.entity_id()),
            title: notification.title.clone(),
            content: notification.content.clone(),
            status: notification.status,
            receiver: notification.receiver.clone(),
        };
        notification.entity.record(created);
        notification
    }

    pub fn from_snapshot(snapshot: NotificationSnapshot) -> Self {
        Self {
            entity: Entity::from_store(
                snapshot.entity_id,
                snapshot.created_at,
                snapshot.updated_at,
            ),
            title: snapshot.title,
            content: snapshot.content,
            status: snapshot.status,
            receiver: snapshot.receiver,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn status(&self) -> NotificationStatus {
        self.status
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn pending(&self) -> &[NotificationEvent] {
        self.entity.pending()
    }

    /// Mark the notification READ and record `NotificationStatusUpdated`.
    /// Only the receiver may do this; anyone else gets `ReceiverMismatch`
    /// and no event is appended.
    pub fn mark_read(&mut self, caller: &str) -> Result<(), NotificationError> {
        if caller != self.receiver {
            return Err(NotificationError::ReceiverMismatch(caller.to_string()));
        }
        self.status = NotificationStatus::Read;
        self.entity.touch();
        let event = NotificationEvent::StatusUpdated {
            meta: EventMeta::new(self.entity.entity_id()),
            status: self.status,
        };
        self.entity.record(event);
        Ok(())
    }
}

impl Aggregate for Notification {
    type Event = NotificationEvent;

    fn entity_id(&self) -> &str {
        self.entity.entity_id()
    }

    fn drain(&mut self) -> Vec<NotificationEvent> {
        self.entity.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_is_unread_with_one_created_event() {
        let mut notification = Notification::new("n1", "New task", "Please do it", "u1");
        assert_eq!(notification.status(), NotificationStatus::Unread);

        let batch = notification.drain();
        assert_eq!(batch.len(), 1);
        match &batch[0] {
            NotificationEvent::Created {
                status, receiver, ..
            } => {
                assert_eq!(*status, NotificationStatus::Unread);
                assert_eq!(receiver, "u1");
            }
            other => panic!("expected NotificationCreated, got {other:?}"),
        }
    }

    #[test]
    fn receiver_can_mark_read() {
        let mut notification = Notification::new("n1", "New task", "Please do it", "u1");
        notification.drain();

        notification.mark_read("u1").unwrap();
        assert_eq!(notification.status(), NotificationStatus::Read);

        let batch = notification.drain();
        assert_eq!(batch.len(), 1);
        assert!(matches!(
            &batch[0],
            NotificationEvent::StatusUpdated {
                status: NotificationStatus::Read,
                ..
            }
        ));
    }

    #[test]
    fn wrong_receiver_is_rejected_without_event() {
        let mut notification = Notification::new("n1", "New task", "Please do it", "u1");
        notification.drain();

        let err = notification.mark_read("u2").unwrap_err();
        assert!(matches!(err, NotificationError::ReceiverMismatch(_)));
        assert_eq!(notification.status(), NotificationStatus::Unread);
        assert!(notification.pending().is_empty());
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(NotificationStatus::Unread.to_string(), "UNREAD");
        assert_eq!(
            "READ".parse::<NotificationStatus>().unwrap(),
            NotificationStatus::Read
        );
    }
}
