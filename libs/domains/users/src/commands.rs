//! User commands, following the load → validate → mutate → persist →
//! publish protocol. Commands are one-shot: `execute` consumes the command.

use event_sourcing::{Aggregate, CommandMeta, EventStoreClient};
use sqlx::PgPool;
use tracing::info;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};
use crate::repository::UserRepository;

/// Register a new user. The login must be free.
#[derive(Debug)]
pub struct CreateUser {
    pub meta: CommandMeta,
    pub login: String,
    pub name: String,
    pub role: Role,
    pub password: String,
}

impl CreateUser {
    pub async fn execute<R: UserRepository>(
        self,
        pool: &PgPool,
        event_store: &EventStoreClient,
        repo: &R,
    ) -> UserResult<()> {
        let mut conn = pool.acquire().await?;

        if repo.fetch_by_login(&mut conn, &self.login).await?.is_some() {
            return Err(UserError::LoginTaken(self.login));
        }

        let mut user = User::new(
            &self.meta.principal_id,
            self.login,
            self.name,
            self.role,
            &self.password,
        )?;
        let mut batch = user.drain();
        repo.persist(&mut conn, &batch).await?;
        event_store.publish_batch(&mut batch).await?;

        info!(
            user_id = %self.meta.principal_id,
            login = %user.login(),
            "created user"
        );
        Ok(())
    }
}
