//! Error types for the event-sourcing substrate.

use thiserror::Error;

/// Errors raised by the event store client and the wire envelope codec.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// A bus operation was attempted while disconnected or draining.
    /// This is a precondition failure; the core never retries it.
    #[error("event store client is not ready (disconnected or draining)")]
    NotReady,

    #[error("failed to connect to event store: {0}")]
    Connect(#[from] async_nats::ConnectError),

    #[error("failed to publish event: {0}")]
    Publish(#[from] async_nats::PublishError),

    #[error("failed to subscribe to event store: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    #[error("failed to flush event store connection: {0}")]
    Flush(#[from] async_nats::client::FlushError),

    #[error("failed to encode or decode event envelope: {0}")]
    Codec(#[from] serde_json::Error),

    /// The envelope named an event this sum type does not know. On the
    /// subscribe path such events are skipped for forward compatibility.
    #[error("unrecognized event name: {0}")]
    UnknownEventName(String),

    #[error("timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),
}
