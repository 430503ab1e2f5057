//! Events emitted by the Notification aggregate.

use event_sourcing::{DomainEvent, EventMeta, EventStoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::NotificationStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Created {
        meta: EventMeta,
        title: String,
        content: String,
        status: NotificationStatus,
        receiver: String,
    },
    StatusUpdated {
        meta: EventMeta,
        status: NotificationStatus,
    },
}

#[derive(Serialize, Deserialize)]
struct CreatedBody {
    title: String,
    content: String,
    status: NotificationStatus,
    receiver: String,
}

#[derive(Serialize, Deserialize)]
struct StatusUpdatedBody {
    status: NotificationStatus,
}

impl DomainEvent for NotificationEvent {
    const ENTITY_TYPE: &'static str = "Notification";

    fn meta(&self) -> &EventMeta {
        match self {
            Self::Created { meta, .. } | Self::StatusUpdated { meta, .. } => meta,
        }
    }

    fn meta_mut(&mut self) -> &mut EventMeta {
        match self {
            Self::Created { meta, .. } | Self::StatusUpdated { meta, .. } => meta,
        }
    }

    fn event_name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "NotificationCreated",
            Self::StatusUpdated { .. } => "NotificationStatusUpdated",
        }
    }

    fn body(&self) -> Result<Value, EventStoreError> {
        let body = match self {
            Self::Created {
                title,
                content,
                status,
                receiver,
                ..
            } => serde_json::to_value(CreatedBody {
                title: title.clone(),
                content: content.clone(),
                status: *status,
                receiver: receiver.clone(),
            })?,
            Self::StatusUpdated { status, .. } => {
                serde_json::to_value(StatusUpdatedBody { status: *status })?
            }
        };
        Ok(body)
    }

    fn from_parts(event_name: &str, meta: EventMeta, body: Value) -> Option<Self> {
        match event_name {
            "NotificationCreated" => {
                let body: CreatedBody = serde_json::from_value(body).ok()?;
                Some(Self::Created {
                    meta,
                    title: body.title,
                    content: body.content,
                    status: body.status,
                    receiver: body.receiver,
                })
            }
            "NotificationStatusUpdated" => {
                let body: StatusUpdatedBody = serde_json::from_value(body).ok()?;
                Some(Self::StatusUpdated {
                    meta,
                    status: body.status,
                })
            }
            _ => None,
        }
    }
}
