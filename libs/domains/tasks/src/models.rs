//! Task aggregate and its status state machine.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use event_sourcing::{Aggregate, Entity, EventMeta};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::TaskError;
use crate::events::TaskEvent;

/// Task lifecycle status. Transitions are monotonic forward-only:
/// PENDING → IN_PROGRESS → COMPLETED; COMPLETED is terminal and re-entering
/// PENDING is always rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

/// Relational snapshot of a task, as read from the projected store.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub entity_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee: String,
    pub author: String,
    pub depends_on: HashSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The Task aggregate root.
///
/// Constructed fresh from storage for each command and discarded after its
/// batch is drained; every state-changing method appends exactly one event
/// describing the change before returning, and appends nothing on failure.
#[derive(Debug, Clone)]
pub struct Task {
    entity: Entity<TaskEvent>,
    title: String,
    description: String,
    status: TaskStatus,
    assignee: String,
    author: String,
    depends_on: HashSet<String>,
}

impl Task {
    /// Create a new task in PENDING and record `TaskCreated`.
    pub fn new(
        entity_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        assignee: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        let mut task = Self {
            entity: Entity::new(entity_id),
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            assignee: assignee.into(),
            author: author.into(),
            depends_on: HashSet::new(),
        };
        let created = TaskEvent::Created {
            meta: EventMeta::new(task.entity.entity_id()),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            assignee: task.assignee.clone(),
            author: task.author.clone(),
        };
        task.entity.record(created);
        task
    }

    /// Rehydrate a task from a relational snapshot. The pending batch
    /// starts empty.
    pub fn from_snapshot(snapshot: TaskSnapshot) -> Self {
        Self {
            entity: Entity::from_store(
                snapshot.entity_id,
                snapshot.created_at,
                snapshot.updated_at,
            ),
            title: snapshot.title,
            description: snapshot.description,
            status: snapshot.status,
            assignee: snapshot.assignee,
            author: snapshot.author,
            depends_on: snapshot.depends_on,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn assignee(&self) -> &str {
        &self.assignee
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn depends_on(&self) -> &HashSet<String> {
        &self.depends_on
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.entity.created_at()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.entity.updated_at()
    }

    /// Events recorded since the last drain.
    pub fn pending(&self) -> &[TaskEvent] {
        self.entity.pending()
    }

    /// Transition the task's status and record `TaskStatusUpdated`.
    ///
    /// Rejected with `InvalidTransition` when the target is PENDING, the
    /// task is already COMPLETED, or the submitter is neither the assignee
    /// nor the author. The recorded event carries the task's author.
    pub fn update_status(
        &mut self,
        status: TaskStatus,
        submitted_by: &str,
    ) -> Result<(), TaskError> {
        if status == TaskStatus::Pending || self.status == TaskStatus::Completed {
            return Err(TaskError::InvalidTransition(format!(
                "{} -> {}",
                self.status, status
            )));
        }
        if submitted_by != self.assignee && submitted_by != self.author {
            return Err(TaskError::InvalidTransition(format!(
                "submitter '{submitted_by}' is neither assignee nor author"
            )));
        }

        self.status = status;
        self.entity.touch();
        let event = TaskEvent::StatusUpdated {
            meta: EventMeta::new(self.entity.entity_id()),
            status,
            author: self.author.clone(),
        };
        self.entity.record(event);
        Ok(())
    }

    /// Add a dependency and record `TaskDependencyAdded`.
    ///
    /// No self-reference or cycle check is performed; only duplicates are
    /// rejected.
    pub fn add_dependency(&mut self, task_id: &str) -> Result<(), TaskError> {
        if self.depends_on.contains(task_id) {
            return Err(TaskError::DependencyDuplicate(task_id.to_string()));
        }
        self.depends_on.insert(task_id.to_string());
        self.entity.touch();
        let event = TaskEvent::DependencyAdded {
            meta: EventMeta::new(self.entity.entity_id()),
            depends_on: task_id.to_string(),
        };
        self.entity.record(event);
        Ok(())
    }

    /// Remove a dependency and record `TaskDependencyRemoved`.
    pub fn remove_dependency(&mut self, task_id: &str) -> Result<(), TaskError> {
        if !self.depends_on.remove(task_id) {
            return Err(TaskError::DependencyNotFound(task_id.to_string()));
        }
        self.entity.touch();
        let event = TaskEvent::DependencyRemoved {
            meta: EventMeta::new(self.entity.entity_id()),
            depends_on: task_id.to_string(),
        };
        self.entity.record(event);
        Ok(())
    }
}

impl Aggregate for Task {
    type Event = TaskEvent;

    fn entity_id(&self) -> &str {
        self.entity.entity_id()
    }

    fn drain(&mut self) -> Vec<TaskEvent> {
        self.entity.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::new("t1", "Pour foundation", "Mix and pour", "u1", "u0")
    }

    #[test]
    fn new_task_is_pending_with_one_created_event() {
        let mut task = task();
        assert_eq!(task.status(), TaskStatus::Pending);

        let batch = task.drain();
        assert_eq!(batch.len(), 1);
        match &batch[0] {
            TaskEvent::Created {
                status,
                assignee,
                author,
                ..
            } => {
                assert_eq!(*status, TaskStatus::Pending);
                assert_eq!(assignee, "u1");
                assert_eq!(author, "u0");
            }
            other => panic!("expected TaskCreated, got {other:?}"),
        }
        assert!(task.drain().is_empty());
    }

    #[test]
    fn valid_transitions_append_one_event_with_author() {
        let mut task = task();
        task.drain();

        task.update_status(TaskStatus::InProgress, "u1").unwrap();
        task.update_status(TaskStatus::Completed, "u0").unwrap();

        let batch = task.drain();
        assert_eq!(batch.len(), 2);
        for event in &batch {
            match event {
                TaskEvent::StatusUpdated { author, .. } => assert_eq!(author, "u0"),
                other => panic!("expected TaskStatusUpdated, got {other:?}"),
            }
        }
    }

    #[test]
    fn completed_is_terminal() {
        let mut task = task();
        task.update_status(TaskStatus::Completed, "u1").unwrap();
        task.drain();

        let err = task
            .update_status(TaskStatus::InProgress, "u1")
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidTransition(_)));
        assert!(task.pending().is_empty());
        assert_eq!(task.status(), TaskStatus::Completed);
    }

    #[test]
    fn reentering_pending_is_always_rejected() {
        let mut task = task();
        task.update_status(TaskStatus::InProgress, "u1").unwrap();
        task.drain();

        let err = task.update_status(TaskStatus::Pending, "u1").unwrap_err();
        assert!(matches!(err, TaskError::InvalidTransition(_)));
        assert!(task.pending().is_empty());
        assert_eq!(task.status(), TaskStatus::InProgress);
    }

    #[test]
    fn third_party_submitter_is_rejected() {
        let mut task = task();
        task.drain();

        let err = task
            .update_status(TaskStatus::InProgress, "u2")
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidTransition(_)));
        assert!(task.pending().is_empty());
        assert_eq!(task.status(), TaskStatus::Pending);
    }

    #[test]
    fn add_dependency_records_event() {
        let mut task = task();
        task.drain();

        task.add_dependency("t2").unwrap();
        assert!(task.depends_on().contains("t2"));

        let batch = task.drain();
        assert_eq!(batch.len(), 1);
        match &batch[0] {
            TaskEvent::DependencyAdded {
                meta, depends_on, ..
            } => {
                assert_eq!(meta.entity_id, "t1");
                assert_eq!(depends_on, "t2");
            }
            other => panic!("expected TaskDependencyAdded, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_dependency_leaves_state_unchanged() {
        let mut task = task();
        task.add_dependency("t2").unwrap();
        task.drain();

        let err = task.add_dependency("t2").unwrap_err();
        assert!(matches!(err, TaskError::DependencyDuplicate(_)));
        assert_eq!(task.depends_on().len(), 1);
        assert!(task.pending().is_empty());
    }

    #[test]
    fn missing_dependency_leaves_state_unchanged() {
        let mut task = task();
        task.drain();

        let err = task.remove_dependency("t9").unwrap_err();
        assert!(matches!(err, TaskError::DependencyNotFound(_)));
        assert!(task.depends_on().is_empty());
        assert!(task.pending().is_empty());
    }

    #[test]
    fn remove_dependency_records_event() {
        let mut task = task();
        task.add_dependency("t2").unwrap();
        task.drain();

        task.remove_dependency("t2").unwrap();
        assert!(task.depends_on().is_empty());

        let batch = task.drain();
        assert!(matches!(&batch[0], TaskEvent::DependencyRemoved { depends_on, .. } if depends_on == "t2"));
    }

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(TaskStatus::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!("PENDING".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert_eq!(
            "COMPLETED".parse::<TaskStatus>().unwrap(),
            TaskStatus::Completed
        );
    }
}
