//! Postgres projection of the Task aggregate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use event_sourcing::DomainEvent;
use sqlx::PgConnection;
use tracing::debug;

use crate::error::{TaskError, TaskResult};
use crate::events::TaskEvent;
use crate::models::{Task, TaskSnapshot, TaskStatus};
use crate::repository::TaskRepository;

const SELECT_TASK: &str = "select entity_id, title, description, author, assignee, status, \
     created_at, updated_at from tasks";

#[derive(sqlx::FromRow)]
struct TaskRow {
    entity_id: String,
    title: String,
    description: String,
    author: String,
    assignee: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_snapshot(self, depends_on: Vec<String>) -> TaskResult<TaskSnapshot> {
        let status: TaskStatus = self
            .status
            .parse()
            .map_err(|_| TaskError::Decode(format!("unknown task status '{}'", self.status)))?;
        Ok(TaskSnapshot {
            entity_id: self.entity_id,
            title: self.title,
            description: self.description,
            status,
            assignee: self.assignee,
            author: self.author,
            depends_on: depends_on.into_iter().collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Default)]
pub struct PgTaskRepository;

impl PgTaskRepository {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_dependencies(
        conn: &mut PgConnection,
        entity_id: &str,
    ) -> TaskResult<Vec<String>> {
        let depends_on = sqlx::query_scalar::<_, String>(
            "select depends_on from task_dependencies where entity_id = $1",
        )
        .bind(entity_id)
        .fetch_all(conn)
        .await?;
        Ok(depends_on)
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn fetch_by_id(
        &self,
        conn: &mut PgConnection,
        entity_id: &str,
    ) -> TaskResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("{SELECT_TASK} where entity_id = $1"))
            .bind(entity_id)
            .fetch_optional(&mut *conn)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let depends_on = Self::fetch_dependencies(conn, entity_id).await?;
        Ok(Some(Task::from_snapshot(row.into_snapshot(depends_on)?)))
    }

    async fn fetch_by_assignee(
        &self,
        conn: &mut PgConnection,
        assignee: &str,
    ) -> TaskResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "{SELECT_TASK} where assignee = $1 order by created_at"
        ))
        .bind(assignee)
        .fetch_all(&mut *conn)
        .await?;

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            let depends_on = Self::fetch_dependencies(conn, &row.entity_id).await?;
            tasks.push(Task::from_snapshot(row.into_snapshot(depends_on)?));
        }
        Ok(tasks)
    }

    async fn fetch_pending_unblocked(
        &self,
        conn: &mut PgConnection,
        assignee: &str,
    ) -> TaskResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "{SELECT_TASK} t1 where t1.status = $1 and t1.assignee = $2 \
             and not exists ( \
                 select 1 from task_dependencies t2 \
                 where t1.entity_id = t2.entity_id \
                   and t2.depends_on not in \
                       (select entity_id from tasks where status = $3))"
        ))
        .bind(TaskStatus::Pending.to_string())
        .bind(assignee)
        .bind(TaskStatus::Completed.to_string())
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter()
            .map(|row| Ok(Task::from_snapshot(row.into_snapshot(Vec::new())?)))
            .collect()
    }

    async fn persist(&self, conn: &mut PgConnection, batch: &[TaskEvent]) -> TaskResult<()> {
        for event in batch {
            match event {
                TaskEvent::Created {
                    meta,
                    title,
                    description,
                    status,
                    assignee,
                    author,
                } => {
                    sqlx::query(
                        "insert into tasks (entity_id, title, description, author, assignee, status) \
                         values ($1, $2, $3, $4, $5, $6)",
                    )
                    .bind(&meta.entity_id)
                    .bind(title)
                    .bind(description)
                    .bind(author)
                    .bind(assignee)
                    .bind(status.to_string())
                    .execute(&mut *conn)
                    .await?;
                }
                TaskEvent::StatusUpdated { meta, status, .. } => {
                    sqlx::query("update tasks set status = $2 where entity_id = $1")
                        .bind(&meta.entity_id)
                        .bind(status.to_string())
                        .execute(&mut *conn)
                        .await?;
                }
                TaskEvent::DependencyAdded { meta, depends_on } => {
                    sqlx::query(
                        "insert into task_dependencies (entity_id, depends_on) values ($1, $2)",
                    )
                    .bind(&meta.entity_id)
                    .bind(depends_on)
                    .execute(&mut *conn)
                    .await?;
                }
                TaskEvent::DependencyRemoved { meta, depends_on } => {
                    sqlx::query(
                        "delete from task_dependencies where entity_id = $1 and depends_on = $2",
                    )
                    .bind(&meta.entity_id)
                    .bind(depends_on)
                    .execute(&mut *conn)
                    .await?;
                }
            }
            debug!(
                entity_id = %event.entity_id(),
                event = %event.event_name(),
                "applied task event"
            );
        }
        Ok(())
    }
}
