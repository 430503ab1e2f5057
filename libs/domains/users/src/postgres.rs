//! Postgres projection of the User aggregate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use event_sourcing::DomainEvent;
use sqlx::PgConnection;
use tracing::debug;

use crate::error::{UserError, UserResult};
use crate::events::UserEvent;
use crate::models::{Role, User, UserSnapshot};
use crate::repository::UserRepository;

const SELECT_USER: &str = "select entity_id, login, name, role, password_hashed, salt, \
     created_at, updated_at from users";

#[derive(sqlx::FromRow)]
struct UserRow {
    entity_id: String,
    login: String,
    name: String,
    role: String,
    password_hashed: String,
    salt: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_snapshot(self) -> UserResult<UserSnapshot> {
        let role: Role = self
            .role
            .parse()
            .map_err(|_| UserError::Decode(format!("unknown user role '{}'", self.role)))?;
        Ok(UserSnapshot {
            entity_id: self.entity_id,
            login: self.login,
            name: self.name,
            role,
            password_hashed: self.password_hashed,
            salt: self.salt,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Default)]
pub struct PgUserRepository;

impl PgUserRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn fetch_by_id(
        &self,
        conn: &mut PgConnection,
        entity_id: &str,
    ) -> UserResult<Option<User>> {
        let row =
            sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} where entity_id = $1"))
                .bind(entity_id)
                .fetch_optional(conn)
                .await?;

        row.map(|row| Ok(User::from_snapshot(row.into_snapshot()?)))
            .transpose()
    }

    async fn fetch_by_login(
        &self,
        conn: &mut PgConnection,
        login: &str,
    ) -> UserResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} where login = $1"))
            .bind(login)
            .fetch_optional(conn)
            .await?;

        row.map(|row| Ok(User::from_snapshot(row.into_snapshot()?)))
            .transpose()
    }

    async fn persist(&self, conn: &mut PgConnection, batch: &[UserEvent]) -> UserResult<()> {
        for event in batch {
            match event {
                UserEvent::Created {
                    meta,
                    login,
                    name,
                    role,
                    password_hashed,
                    salt,
                } => {
                    sqlx::query(
                        "insert into users (entity_id, login, name, role, password_hashed, salt) \
                         values ($1, $2, $3, $4, $5, $6)",
                    )
                    .bind(&meta.entity_id)
                    .bind(login)
                    .bind(name)
                    .bind(role.to_string())
                    .bind(password_hashed)
                    .bind(salt)
                    .execute(&mut *conn)
                    .await?;
                }
            }
            debug!(
                entity_id = %event.entity_id(),
                event = %event.event_name(),
                "applied user event"
            );
        }
        Ok(())
    }
}
