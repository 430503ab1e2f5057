//! Events emitted by the Task aggregate.

use event_sourcing::{DomainEvent, EventMeta, EventStoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::TaskStatus;

/// Closed sum type of every event a Task can emit.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Created {
        meta: EventMeta,
        title: String,
        description: String,
        status: TaskStatus,
        assignee: String,
        author: String,
    },
    StatusUpdated {
        meta: EventMeta,
        status: TaskStatus,
        author: String,
    },
    DependencyAdded {
        meta: EventMeta,
        depends_on: String,
    },
    DependencyRemoved {
        meta: EventMeta,
        depends_on: String,
    },
}

#[derive(Serialize, Deserialize)]
struct CreatedBody {
    title: String,
    description: String,
    status: TaskStatus,
    assignee: String,
    author: String,
}

#[derive(Serialize, Deserialize)]
struct StatusUpdatedBody {
    status: TaskStatus,
    author: String,
}

#[derive(Serialize, Deserialize)]
struct DependencyBody {
    depends_on: String,
}

impl DomainEvent for TaskEvent {
    const ENTITY_TYPE: &'static str = "Task";

    fn meta(&self) -> &EventMeta {
        match self {
            Self::Created { meta, .. }
            | Self::StatusUpdated { meta, .. }
            | Self::DependencyAdded { meta, .. }
            | Self::DependencyRemoved { meta, .. } => meta,
        }
    }

    fn meta_mut(&mut self) -> &mut EventMeta {
        match self {
            Self::Created { meta, .. }
            | Self::StatusUpdated { meta, .. }
            | Self::DependencyAdded { meta, .. }
            | Self::DependencyRemoved { meta, .. } => meta,
        }
    }

    fn event_name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "TaskCreated",
            Self::StatusUpdated { .. } => "TaskStatusUpdated",
            Self::DependencyAdded { .. } => "TaskDependencyAdded",
            Self::DependencyRemoved { .. } => "TaskDependencyRemoved",
        }
    }

    fn body(&self) -> Result<Value, EventStoreError> {
        let body = match self {
            Self::Created {
                title,
                description,
                status,
                assignee,
                author,
                ..
            } => serde_json::to_value(CreatedBody {
                title: title.clone(),
                description: description.clone(),
                status: *status,
                assignee: assignee.clone(),
                author: author.clone(),
            })?,
            Self::StatusUpdated { status, author, .. } => {
                serde_json::to_value(StatusUpdatedBody {
                    status: *status,
                    author: author.clone(),
                })?
            }
            Self::DependencyAdded { depends_on, .. }
            | Self::DependencyRemoved { depends_on, .. } => {
                serde_json::to_value(DependencyBody {
                    depends_on: depends_on.clone(),
                })?
            }
        };
        Ok(body)
    }

    fn from_parts(event_name: &str, meta: EventMeta, body: Value) -> Option<Self> {
        match event_name {
            "TaskCreated" => {
                let body: CreatedBody = serde_json::from_value(body).ok()?;
                Some(Self::Created {
                    meta,
                    title: body.title,
                    description: body.description,
                    status: body.status,
                    assignee: body.assignee,
                    author: body.author,
                })
            }
            "TaskStatusUpdated" => {
                let body: StatusUpdatedBody = serde_json::from_value(body).ok()?;
                Some(Self::StatusUpdated {
                    meta,
                    status: body.status,
                    author: body.author,
                })
            }
            "TaskDependencyAdded" => {
                let body: DependencyBody = serde_json::from_value(body).ok()?;
                Some(Self::DependencyAdded {
                    meta,
                    depends_on: body.depends_on,
                })
            }
            "TaskDependencyRemoved" => {
                let body: DependencyBody = serde_json::from_value(body).ok()?;
                Some(Self::DependencyRemoved {
                    meta,
                    depends_on: body.depends_on,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_events() -> Vec<TaskEvent> {
        vec![
            TaskEvent::Created {
                meta: EventMeta::new("t1"),
                title: "Pour foundation".to_string(),
                description: "Mix and pour".to_string(),
                status: TaskStatus::Pending,
                assignee: "u1".to_string(),
                author: "u0".to_string(),
            },
            TaskEvent::StatusUpdated {
                meta: EventMeta::new("t1"),
                status: TaskStatus::InProgress,
                author: "u0".to_string(),
            },
            TaskEvent::DependencyAdded {
                meta: EventMeta::new("t1"),
                depends_on: "t2".to_string(),
            },
            TaskEvent::DependencyRemoved {
                meta: EventMeta::new("t1"),
                depends_on: "t2".to_string(),
            },
        ]
    }

    #[test]
    fn round_trip_is_stable_for_every_variant() {
        for mut event in sample_events() {
            let raw = event.serialize().unwrap();
            let mut decoded = TaskEvent::deserialize(&raw).unwrap();
            assert_eq!(decoded.serialize().unwrap(), raw, "{}", event.event_name());
        }
    }

    #[test]
    fn status_uses_original_wire_casing() {
        let mut event = TaskEvent::StatusUpdated {
            meta: EventMeta::new("t1"),
            status: TaskStatus::InProgress,
            author: "u0".to_string(),
        };
        let raw = event.serialize().unwrap();
        let value: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["body"]["status"], "IN_PROGRESS");
        assert_eq!(value["head"]["event_name"], "TaskStatusUpdated");
        assert_eq!(value["head"]["entity_type"], "Task");
    }

    #[test]
    fn created_event_channel() {
        let event = &sample_events()[0];
        assert_eq!(event.channel(), "events.entity.Task.t1.TaskCreated");
    }

    #[test]
    fn unknown_event_name_decodes_to_none() {
        let meta = EventMeta::new("t1");
        assert!(TaskEvent::from_parts("TaskArchived", meta, Value::Null).is_none());
    }
}
