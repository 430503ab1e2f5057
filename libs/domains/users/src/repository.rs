use async_trait::async_trait;
use sqlx::PgConnection;

use crate::error::UserResult;
use crate::events::UserEvent;
use crate::models::User;

/// Data access interface for users. Absence is `Ok(None)`, never an error.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn fetch_by_id(
        &self,
        conn: &mut PgConnection,
        entity_id: &str,
    ) -> UserResult<Option<User>>;

    async fn fetch_by_login(
        &self,
        conn: &mut PgConnection,
        login: &str,
    ) -> UserResult<Option<User>>;

    /// Apply a drained batch to the projected store, in batch order.
    async fn persist(&self, conn: &mut PgConnection, batch: &[UserEvent]) -> UserResult<()>;
}
