//! Event-sourcing substrate shared by all aggregate domains.
//!
//! This library provides the building blocks that turn a validated mutation
//! into a durable event batch and a published notification:
//!
//! - **Entity & event model**: [`Entity`] holds the identity, timestamps and
//!   pending-event batch of an aggregate root; [`Aggregate`] and
//!   [`DomainEvent`] are the seams each domain implements.
//! - **Wire envelope**: a self-describing `{"head": .., "body": ..}` JSON
//!   payload with epoch-millisecond timestamps.
//! - **Event store client**: [`EventStoreClient`] binds typed events to a
//!   hierarchical NATS channel namespace
//!   (`events.<event_class>.<entity_type>.<entity_id>.<event_name>`) for
//!   publishing and wildcard subscriptions.
//!
//! The event stream is a broadcast/audit channel, not the system of record:
//! current state is read from the projected relational store, and there is no
//! replay or aggregate reconstruction here.

mod entity;
mod error;
mod event;
mod store;

pub use entity::{Aggregate, CommandMeta, Entity};
pub use error::EventStoreError;
pub use event::{DomainEvent, EventMeta};
pub use store::{channel_pattern, EventStoreClient, EventStream, Subscription};
