//! User aggregate.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use event_sourcing::{Aggregate, Entity, EventMeta};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{UserError, UserResult};
use crate::events::UserEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Worker,
    Manager,
}

/// Relational snapshot of a user.
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    pub entity_id: String,
    pub login: String,
    pub name: String,
    pub role: Role,
    pub password_hashed: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The User aggregate root. Only the Argon2 PHC string is kept; the plain
/// password never leaves the constructor.
#[derive(Debug, Clone)]
pub struct User {
    entity: Entity<UserEvent>,
    login: String,
    name: String,
    role: Role,
    password_hashed: String,
    salt: String,
}

impl User {
    /// Register a new user and record `UserCreated`. The login doubles as
    /// the hashing salt, so hashes are deterministic per (login, password).
    pub fn new(
        entity_id: impl Into<String>,
        login: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        plain_password: &str,
    ) -> UserResult<Self> {
        let login = login.into();
        let password_hashed = hash_password(plain_password, &login)?;
        let mut user = Self {
            entity: Entity::new(entity_id),
            salt: login.clone(),
            login,
            name: name.into(),
            role,
            password_hashed,
        };
        let created = UserEvent::Created {
            meta: EventMeta::new(user.entity.entity_id()),
            login: user.login.clone(),
            name: user.name.clone(),
            role: user.role,
            password_hashed: user.password_hashed.clone(),
            salt: user.salt.clone(),
        };
        user.entity.record(created);
        Ok(user)
    }

    pub fn from_snapshot(snapshot: UserSnapshot) -> Self {
        Self {
            entity: Entity::from_store(
                snapshot.entity_id,
                snapshot.created_at,
                snapshot.updated_at,
            ),
            login: snapshot.login,
            name: snapshot.name,
            role: snapshot.role,
            password_hashed: snapshot.password_hashed,
            salt: snapshot.salt,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn password_hashed(&self) -> &str {
        &self.password_hashed
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn verify_password(&self, plain_password: &str) -> UserResult<bool> {
        let parsed = PasswordHash::new(&self.password_hashed)
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plain_password.as_bytes(), &parsed)
            .is_ok())
    }
}

impl Aggregate for User {
    type Event = UserEvent;

    fn entity_id(&self) -> &str {
        self.entity.entity_id()
    }

    fn drain(&mut self) -> Vec<UserEvent> {
        self.entity.drain()
    }
}

fn hash_password(plain_password: &str, salt: &str) -> UserResult<String> {
    let salt = SaltString::encode_b64(salt.as_bytes())
        .map_err(|e| UserError::PasswordHash(e.to_string()))?;
    Argon2::default()
        .hash_password(plain_password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_records_created_with_hashed_password() {
        let mut user = User::new("u1", "jdoe", "Jane Doe", Role::Worker, "hunter22").unwrap();
        let batch = user.drain();
        assert_eq!(batch.len(), 1);
        match &batch[0] {
            UserEvent::Created {
                login,
                password_hashed,
                salt,
                ..
            } => {
                assert_eq!(login, "jdoe");
                assert_eq!(salt, "jdoe");
                assert!(password_hashed.starts_with("$argon2"));
                assert_ne!(password_hashed, "hunter22");
            }
        }
    }

    #[test]
    fn same_login_and_password_hash_identically() {
        let a = User::new("u1", "jdoe", "Jane Doe", Role::Worker, "hunter22").unwrap();
        let b = User::new("u2", "jdoe", "John Doe", Role::Manager, "hunter22").unwrap();
        assert_eq!(a.password_hashed(), b.password_hashed());
    }

    #[test]
    fn verify_password_accepts_the_original_and_rejects_others() {
        let user = User::new("u1", "jdoe", "Jane Doe", Role::Manager, "hunter22").unwrap();
        assert!(user.verify_password("hunter22").unwrap());
        assert!(!user.verify_password("hunter23").unwrap());
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Manager.to_string(), "MANAGER");
        assert_eq!("WORKER".parse::<Role>().unwrap(), Role::Worker);
    }
}
