use event_sourcing::EventStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification not found: {0}")]
    NotFound(String),

    #[error("notification receiver mismatch: {0}")]
    ReceiverMismatch(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid value in storage: {0}")]
    Decode(String),

    #[error(transparent)]
    EventStore(#[from] EventStoreError),
}

pub type NotificationResult<T> = Result<T, NotificationError>;
