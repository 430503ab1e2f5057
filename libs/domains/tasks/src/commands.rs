//! Task commands.
//!
//! Every command follows the same protocol: load → validate → mutate →
//! persist → publish. Commands are one-shot: `execute` consumes the command.
//! Persistence happens before publication, but the two writes share no
//! transaction; a crash in between leaves the relational store correct and
//! the event stream incomplete (accepted best-effort broadcast).

use event_sourcing::{Aggregate, CommandMeta, EventStoreClient};
use sqlx::PgPool;
use tracing::info;

use crate::error::{TaskError, TaskResult};
use crate::models::{Task, TaskStatus};
use crate::repository::TaskRepository;

/// Create a new task in PENDING. No preconditions.
#[derive(Debug)]
pub struct CreateTask {
    pub meta: CommandMeta,
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub author: String,
}

impl CreateTask {
    pub async fn execute<R: TaskRepository>(
        self,
        pool: &PgPool,
        event_store: &EventStoreClient,
        repo: &R,
    ) -> TaskResult<()> {
        let mut conn = pool.acquire().await?;

        let mut task = Task::new(
            &self.meta.principal_id,
            self.title,
            self.description,
            self.assignee,
            self.author,
        );
        let mut batch = task.drain();
        repo.persist(&mut conn, &batch).await?;
        event_store.publish_batch(&mut batch).await?;

        info!(task_id = %self.meta.principal_id, "created task");
        Ok(())
    }
}

/// Transition a task's status. The status state machine and the submitter
/// check live on the aggregate.
#[derive(Debug)]
pub struct UpdateTaskStatus {
    pub meta: CommandMeta,
    pub status: TaskStatus,
    pub submitted_by: String,
}

impl UpdateTaskStatus {
    pub async fn execute<R: TaskRepository>(
        self,
        pool: &PgPool,
        event_store: &EventStoreClient,
        repo: &R,
    ) -> TaskResult<()> {
        let mut conn = pool.acquire().await?;

        let mut task = repo
            .fetch_by_id(&mut conn, &self.meta.principal_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(self.meta.principal_id.clone()))?;

        task.update_status(self.status, &self.submitted_by)?;

        let mut batch = task.drain();
        repo.persist(&mut conn, &batch).await?;
        event_store.publish_batch(&mut batch).await?;

        info!(task_id = %self.meta.principal_id, status = %self.status, "updated task status");
        Ok(())
    }
}

/// Add `depends_on` to the target task's dependency set. Both tasks must
/// exist; no self-reference or cycle check is performed.
#[derive(Debug)]
pub struct AddDependency {
    pub meta: CommandMeta,
    pub depends_on: String,
}

impl AddDependency {
    pub async fn execute<R: TaskRepository>(
        self,
        pool: &PgPool,
        event_store: &EventStoreClient,
        repo: &R,
    ) -> TaskResult<()> {
        let mut conn = pool.acquire().await?;

        let mut task = repo
            .fetch_by_id(&mut conn, &self.meta.principal_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(self.meta.principal_id.clone()))?;
        if repo
            .fetch_by_id(&mut conn, &self.depends_on)
            .await?
            .is_none()
        {
            return Err(TaskError::NotFound(self.depends_on));
        }

        task.add_dependency(&self.depends_on)?;

        let mut batch = task.drain();
        repo.persist(&mut conn, &batch).await?;
        event_store.publish_batch(&mut batch).await?;

        info!(
            task_id = %self.meta.principal_id,
            depends_on = %self.depends_on,
            "added task dependency"
        );
        Ok(())
    }
}

/// Remove `depends_on` from the target task's dependency set.
#[derive(Debug)]
pub struct RemoveDependency {
    pub meta: CommandMeta,
    pub depends_on: String,
}

impl RemoveDependency {
    pub async fn execute<R: TaskRepository>(
        self,
        pool: &PgPool,
        event_store: &EventStoreClient,
        repo: &R,
    ) -> TaskResult<()> {
        let mut conn = pool.acquire().await?;

        let mut task = repo
            .fetch_by_id(&mut conn, &self.meta.principal_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(self.meta.principal_id.clone()))?;
        if repo
            .fetch_by_id(&mut conn, &self.depends_on)
            .await?
            .is_none()
        {
            return Err(TaskError::NotFound(self.depends_on));
        }

        task.remove_dependency(&self.depends_on)?;

        let mut batch = task.drain();
        repo.persist(&mut conn, &batch).await?;
        event_store.publish_batch(&mut batch).await?;

        info!(
            task_id = %self.meta.principal_id,
            depends_on = %self.depends_on,
            "removed task dependency"
        );
        Ok(())
    }
}
