use event_sourcing::EventStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("invalid task status transition: {0}")]
    InvalidTransition(String),

    #[error("task dependency already present: {0}")]
    DependencyDuplicate(String),

    #[error("task dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid value in storage: {0}")]
    Decode(String),

    #[error(transparent)]
    EventStore(#[from] EventStoreError),
}

pub type TaskResult<T> = Result<T, TaskError>;
