use async_trait::async_trait;
use sqlx::PgConnection;

use crate::error::TaskResult;
use crate::events::TaskEvent;
use crate::models::Task;

/// Data access interface for tasks.
///
/// Reads reconstruct aggregate snapshots from relational rows, not from the
/// event log; absence is `Ok(None)` or an empty vec, never an error.
/// All methods take a transaction-scoped connection handle acquired by the
/// executing command.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn fetch_by_id(
        &self,
        conn: &mut PgConnection,
        entity_id: &str,
    ) -> TaskResult<Option<Task>>;

    async fn fetch_by_assignee(
        &self,
        conn: &mut PgConnection,
        assignee: &str,
    ) -> TaskResult<Vec<Task>>;

    /// PENDING tasks of an assignee whose dependencies are all COMPLETED.
    async fn fetch_pending_unblocked(
        &self,
        conn: &mut PgConnection,
        assignee: &str,
    ) -> TaskResult<Vec<Task>>;

    /// Apply a drained batch to the projected store, one idempotent
    /// row-level SQL effect per event, in batch order.
    async fn persist(&self, conn: &mut PgConnection, batch: &[TaskEvent]) -> TaskResult<()>;
}
