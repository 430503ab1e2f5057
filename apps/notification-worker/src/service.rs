//! Task event → notification translation.
//!
//! The translation is an exhaustive match over the task event sum type, so
//! adding a task event variant without deciding its notification behavior
//! is a compile error rather than a silent no-op.

use domain_notifications::{CreateNotification, NotificationRepository, NotificationResult};
use domain_tasks::TaskEvent;
use event_sourcing::{CommandMeta, DomainEvent, EventStoreClient};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// The notification a task event calls for, before it gets an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub title: String,
    pub content: String,
    pub receiver: String,
}

/// Decide what notification (if any) a task event warrants.
///
/// Status updates notify the author with the "completed" text on every
/// transition, not only on completion.
pub fn notification_for(event: &TaskEvent) -> Option<NotificationDraft> {
    match event {
        TaskEvent::Created {
            title,
            description,
            assignee,
            ..
        } => Some(NotificationDraft {
            title: format!("New task: {title}"),
            content: format!("Please do the following task:\n----\n{description}"),
            receiver: assignee.clone(),
        }),
        TaskEvent::StatusUpdated { meta, author, .. } => Some(NotificationDraft {
            title: format!("Task: {} has been completed", meta.entity_id),
            content: "Please review the completed task".to_string(),
            receiver: author.clone(),
        }),
        TaskEvent::DependencyAdded { .. } | TaskEvent::DependencyRemoved { .. } => None,
    }
}

/// Issues `CreateNotification` commands in reaction to task events.
pub struct NotificationService<R> {
    pool: PgPool,
    repo: R,
}

impl<R: NotificationRepository> NotificationService<R> {
    pub fn new(pool: PgPool, repo: R) -> Self {
        Self { pool, repo }
    }

    /// React to one task event. Events that warrant no notification are
    /// skipped silently.
    pub async fn handle_event(
        &self,
        event_store: &EventStoreClient,
        event: &TaskEvent,
    ) -> NotificationResult<()> {
        let Some(draft) = notification_for(event) else {
            return Ok(());
        };

        info!(
            task_id = %event.entity_id(),
            event = %event.event_name(),
            receiver = %draft.receiver,
            "issuing notification"
        );

        let command = CreateNotification {
            meta: CommandMeta::new(Uuid::new_v4().to_string(), Uuid::new_v4().to_string()),
            title: draft.title,
            content: draft.content,
            receiver: draft.receiver,
        };
        command.execute(&self.pool, event_store, &self.repo).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_tasks::TaskStatus;
    use event_sourcing::EventMeta;

    #[test]
    fn task_created_notifies_the_assignee() {
        let event = TaskEvent::Created {
            meta: EventMeta::new("t1"),
            title: "Pour the foundation".to_string(),
            description: "Concrete, grade M400".to_string(),
            status: TaskStatus::Pending,
            assignee: "u1".to_string(),
            author: "u2".to_string(),
        };

        let draft = notification_for(&event).unwrap();
        assert_eq!(draft.receiver, "u1");
        assert_eq!(draft.title, "New task: Pour the foundation");
        assert_eq!(
            draft.content,
            "Please do the following task:\n----\nConcrete, grade M400"
        );
    }

    #[test]
    fn any_status_update_notifies_the_author() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            let event = TaskEvent::StatusUpdated {
                meta: EventMeta::new("t1"),
                status,
                author: "u2".to_string(),
            };

            let draft = notification_for(&event).unwrap();
            assert_eq!(draft.receiver, "u2");
            assert_eq!(draft.title, "Task: t1 has been completed");
            assert_eq!(draft.content, "Please review the completed task");
        }
    }

    #[test]
    fn dependency_events_warrant_no_notification() {
        let added = TaskEvent::DependencyAdded {
            meta: EventMeta::new("t1"),
            depends_on: "t2".to_string(),
        };
        let removed = TaskEvent::DependencyRemoved {
            meta: EventMeta::new("t1"),
            depends_on: "t2".to_string(),
        };

        assert!(notification_for(&added).is_none());
        assert!(notification_for(&removed).is_none());
    }
}
