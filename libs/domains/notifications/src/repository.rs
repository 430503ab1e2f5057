use async_trait::async_trait;
use sqlx::PgConnection;

use crate::error::NotificationResult;
use crate::events::NotificationEvent;
use crate::models::Notification;

/// Data access interface for notifications. Absence is `Ok(None)` or an
/// empty vec, never an error.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn fetch_by_id(
        &self,
        conn: &mut PgConnection,
        entity_id: &str,
    ) -> NotificationResult<Option<Notification>>;

    async fn fetch_all_for_receiver(
        &self,
        conn: &mut PgConnection,
        receiver: &str,
    ) -> NotificationResult<Vec<Notification>>;

    /// Apply a drained batch to the projected store, in batch order.
    async fn persist(
        &self,
        conn: &mut PgConnection,
        batch: &[NotificationEvent],
    ) -> NotificationResult<()>;
}
