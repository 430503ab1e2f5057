//! Events emitted by the User aggregate.

use event_sourcing::{DomainEvent, EventMeta, EventStoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Role;

#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    Created {
        meta: EventMeta,
        login: String,
        name: String,
        role: Role,
        password_hashed: String,
        salt: String,
    },
}

#[derive(Serialize, Deserialize)]
struct CreatedBody {
    login: String,
    name: String,
    role: Role,
    password_hashed: String,
    salt: String,
}

impl DomainEvent for UserEvent {
    const ENTITY_TYPE: &'static str = "User";

    fn meta(&self) -> &EventMeta {
        match self {
            Self::Created { meta, .. } => meta,
        }
    }

    fn meta_mut(&mut self) -> &mut EventMeta {
        match self {
            Self::Created { meta, .. } => meta,
        }
    }

    fn event_name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "UserCreated",
        }
    }

    fn body(&self) -> Result<Value, EventStoreError> {
        let body = match self {
            Self::Created {
                login,
                name,
                role,
                password_hashed,
                salt,
                ..
            } => serde_json::to_value(CreatedBody {
                login: login.clone(),
                name: name.clone(),
                role: *role,
                password_hashed: password_hashed.clone(),
                salt: salt.clone(),
            })?,
        };
        Ok(body)
    }

    fn from_parts(event_name: &str, meta: EventMeta, body: Value) -> Option<Self> {
        match event_name {
            "UserCreated" => {
                let body: CreatedBody = serde_json::from_value(body).ok()?;
                Some(Self::Created {
                    meta,
                    login: body.login,
                    name: body.name,
                    role: body.role,
                    password_hashed: body.password_hashed,
                    salt: body.salt,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created() -> UserEvent {
        UserEvent::Created {
            meta: EventMeta::new("u1"),
            login: "jdoe".to_string(),
            name: "Jane Doe".to_string(),
            role: Role::Worker,
            password_hashed: "$argon2id$v=19$m=19456,t=2,p=1$amRvZQ$xyz".to_string(),
            salt: "jdoe".to_string(),
        }
    }

    #[test]
    fn round_trip_is_stable() {
        let mut event = created();
        let raw = event.serialize().unwrap();
        let mut decoded = UserEvent::deserialize(&raw).unwrap();
        assert_eq!(decoded.serialize().unwrap(), raw);
    }

    #[test]
    fn wire_shape_carries_role_casing() {
        let mut event = created();
        let raw = event.serialize().unwrap();
        let value: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["head"]["event_name"], "UserCreated");
        assert_eq!(value["head"]["entity_type"], "User");
        assert_eq!(value["body"]["role"], "WORKER");
    }

    #[test]
    fn unknown_event_name_decodes_to_none() {
        assert!(UserEvent::from_parts("UserDeleted", EventMeta::new("u1"), Value::Null).is_none());
    }
}
