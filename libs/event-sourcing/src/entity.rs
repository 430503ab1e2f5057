//! Aggregate root state and command metadata.

use chrono::{DateTime, Utc};

use crate::event::DomainEvent;

/// State common to every aggregate root, embedded by composition.
///
/// Holds the identity, lifecycle timestamps, the advisory version counter
/// and the transient pending-event batch. Every state-changing operation on
/// an aggregate appends exactly one event to the batch before returning;
/// [`Entity::drain`] is the only way to take those events out.
#[derive(Debug, Clone)]
pub struct Entity<E> {
    entity_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
    batch: Vec<E>,
}

impl<E> Entity<E> {
    /// State for a brand-new aggregate.
    pub fn new(entity_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            entity_id: entity_id.into(),
            created_at: now,
            updated_at: now,
            version: 0,
            batch: Vec::new(),
        }
    }

    /// State rehydrated from a relational snapshot. The batch starts empty:
    /// aggregates live only for the duration of one command execution.
    pub fn from_store(
        entity_id: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            created_at,
            updated_at,
            version: 0,
            batch: Vec::new(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Monotonic version counter. Currently advisory: no optimistic
    /// concurrency check is enforced on write.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Append an event to the pending batch.
    pub fn record(&mut self, event: E) {
        self.batch.push(event);
    }

    /// Events recorded since the last drain, in emission order.
    pub fn pending(&self) -> &[E] {
        &self.batch
    }

    /// Atomically empty and return the pending batch. The batch is the sole
    /// record of pending changes, so this must be called exactly once per
    /// persistence cycle; an immediate second call returns an empty vec.
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.batch)
    }
}

/// The consistency boundary each domain aggregate implements.
pub trait Aggregate {
    type Event: DomainEvent;

    fn entity_id(&self) -> &str;

    /// Drain the pending-event batch, preserving emission order.
    fn drain(&mut self) -> Vec<Self::Event>;
}

/// Metadata carried by every command. Transient: commands are never
/// persisted, `command_id` is an idempotency/audit token only.
#[derive(Debug, Clone)]
pub struct CommandMeta {
    /// Target aggregate or subject id.
    pub principal_id: String,
    pub command_id: String,
    pub created_at: DateTime<Utc>,
}

impl CommandMeta {
    pub fn new(principal_id: impl Into<String>, command_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            command_id: command_id.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_emission_order() {
        let mut entity: Entity<u32> = Entity::new("e1");
        entity.record(1);
        entity.record(2);
        entity.record(3);

        assert_eq!(entity.drain(), vec![1, 2, 3]);
    }

    #[test]
    fn drain_is_idempotent_empty() {
        let mut entity: Entity<u32> = Entity::new("e1");
        entity.record(7);

        assert_eq!(entity.drain(), vec![7]);
        assert!(entity.drain().is_empty());
    }

    #[test]
    fn touch_advances_updated_at() {
        let mut entity: Entity<u32> = Entity::new("e1");
        let before = entity.updated_at();
        entity.touch();
        assert!(entity.updated_at() >= before);
    }

    #[test]
    fn command_meta_carries_principal_and_command_ids() {
        let meta = CommandMeta::new("t1", "c1");
        assert_eq!(meta.principal_id, "t1");
        assert_eq!(meta.command_id, "c1");
    }
}
