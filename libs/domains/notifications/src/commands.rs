//! Notification commands, following the load → validate → mutate →
//! persist → publish protocol. Commands are one-shot: `execute` consumes
//! the command.

use event_sourcing::{Aggregate, CommandMeta, EventStoreClient};
use sqlx::PgPool;
use tracing::info;

use crate::error::{NotificationError, NotificationResult};
use crate::models::Notification;
use crate::repository::NotificationRepository;

/// Deliver a new notification to `receiver`. No preconditions.
#[derive(Debug)]
pub struct CreateNotification {
    pub meta: CommandMeta,
    pub title: String,
    pub content: String,
    pub receiver: String,
}

impl CreateNotification {
    pub async fn execute<R: NotificationRepository>(
        self,
        pool: &PgPool,
        event_store: &EventStoreClient,
        repo: &R,
    ) -> NotificationResult<()> {
        let mut conn = pool.acquire().await?;

        let mut notification = Notification::new(
            &self.meta.principal_id,
            self.title,
            self.content,
            self.receiver,
        );
        let mut batch = notification.drain();
        repo.persist(&mut conn, &batch).await?;
        event_store.publish_batch(&mut batch).await?;

        info!(
            notification_id = %self.meta.principal_id,
            receiver = %notification.receiver(),
            "created notification"
        );
        Ok(())
    }
}

/// Mark a notification READ. The receiver check lives on the aggregate.
#[derive(Debug)]
pub struct MarkNotificationRead {
    pub meta: CommandMeta,
    pub receiver: String,
}

impl MarkNotificationRead {
    pub async fn execute<R: NotificationRepository>(
        self,
        pool: &PgPool,
        event_store: &EventStoreClient,
        repo: &R,
    ) -> NotificationResult<()> {
        let mut conn = pool.acquire().await?;

        let mut notification = repo
            .fetch_by_id(&mut conn, &self.meta.principal_id)
            .await?
            .ok_or_else(|| NotificationError::NotFound(self.meta.principal_id.clone()))?;

        notification.mark_read(&self.receiver)?;

        let mut batch = notification.drain();
        repo.persist(&mut conn, &batch).await?;
        event_store.publish_batch(&mut batch).await?;

        info!(notification_id = %self.meta.principal_id, "marked notification read");
        Ok(())
    }
}
