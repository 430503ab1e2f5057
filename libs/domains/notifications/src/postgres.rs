//! Postgres projection of the Notification aggregate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use event_sourcing::DomainEvent;
use sqlx::PgConnection;
use tracing::debug;

use crate::error::{NotificationError, NotificationResult};
use crate::events::NotificationEvent;
use crate::models::{Notification, NotificationSnapshot, NotificationStatus};
use crate::repository::NotificationRepository;

const SELECT_NOTIFICATION: &str = "select entity_id, title, content, status, receiver, \
     created_at, updated_at from notifications";

#[derive(sqlx::FromRow)]
struct NotificationRow {
    entity_id: String,
    title: String,
    content: String,
    status: String,
    receiver: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_snapshot(self) -> NotificationResult<NotificationSnapshot> {
        let status: NotificationStatus = self.status.parse().map_err(|_| {
            NotificationError::Decode(format!("unknown notification status '{}'", self.status))
        })?;
        Ok(NotificationSnapshot {
            entity_id: self.entity_id,
            title: self.title,
            content: self.content,
            status,
            receiver: self.receiver,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Default)]
pub struct PgNotificationRepository;

impl PgNotificationRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn fetch_by_id(
        &self,
        conn: &mut PgConnection,
        entity_id: &str,
    ) -> NotificationResult<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "{SELECT_NOTIFICATION} where entity_id = $1"
        ))
        .bind(entity_id)
        .fetch_optional(conn)
        .await?;

        row.map(|row| Ok(Notification::from_snapshot(row.into_snapshot()?)))
            .transpose()
    }

    async fn fetch_all_for_receiver(
        &self,
        conn: &mut PgConnection,
        receiver: &str,
    ) -> NotificationResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "{SELECT_NOTIFICATION} where receiver = $1 order by created_at"
        ))
        .bind(receiver)
        .fetch_all(conn)
        .await?;

        rows.into_iter()
            .map(|row| Ok(Notification::from_snapshot(row.into_snapshot()?)))
            .collect()
    }

    async fn persist(
        &self,
        conn: &mut PgConnection,
        batch: &[NotificationEvent],
    ) -> NotificationResult<()> {
        for event in batch {
            match event {
                NotificationEvent::Created {
                    meta,
                    title,
                    content,
                    status,
                    receiver,
                } => {
                    sqlx::query(
                        "insert into notifications (entity_id, title, content, status, receiver) \
                         values ($1, $2, $3, $4, $5)",
                    )
                    .bind(&meta.entity_id)
                    .bind(title)
                    .bind(content)
                    .bind(status.to_string())
                    .bind(receiver)
                    .execute(&mut *conn)
                    .await?;
                }
                NotificationEvent::StatusUpdated { meta, status } => {
                    sqlx::query(
                        "update notifications \
                         set status = $2, updated_at = (now() at time zone 'utc') \
                         where entity_id = $1",
                    )
                    .bind(&meta.entity_id)
                    .bind(status.to_string())
                    .execute(&mut *conn)
                    .await?;
                }
            }
            debug!(
                entity_id = %event.entity_id(),
                event = %event.event_name(),
                "applied notification event"
            );
        }
        Ok(())
    }
}
