use event_sourcing::EventStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(String),

    #[error("login already taken: {0}")]
    LoginTaken(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid value in storage: {0}")]
    Decode(String),

    #[error(transparent)]
    EventStore(#[from] EventStoreError),
}

pub type UserResult<T> = Result<T, UserError>;
