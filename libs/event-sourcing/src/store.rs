//! Pub/sub transport binding typed events to the hierarchical channel
//! namespace `events.<event_class>.<entity_type>.<entity_id>.<event_name>`.

use std::marker::PhantomData;

use async_nats::connection::State;
use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::EventStoreError;
use crate::event::DomainEvent;

/// Resolve a channel address, wildcarding unset segments with `*`.
pub fn channel_pattern(
    event_class: Option<&str>,
    entity_type: Option<&str>,
    entity_id: Option<&str>,
    event_name: Option<&str>,
) -> String {
    format!(
        "events.{}.{}.{}.{}",
        event_class.unwrap_or("*"),
        entity_type.unwrap_or("*"),
        entity_id.unwrap_or("*"),
        event_name.unwrap_or("*")
    )
}

/// The selector a subscription filters on: either a whole event class or
/// one concrete event type, never both and never neither. The enum makes
/// the invalid combinations unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    EventClass(String),
    Event {
        event_class: &'static str,
        event_name: String,
    },
}

/// A wildcard subscription over the event channel namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    selector: Selector,
    entity_type: Option<String>,
    entity_id: Option<String>,
}

impl Subscription {
    /// Subscribe to every event of one broad class (e.g. `"entity"`).
    pub fn for_event_class(event_class: impl Into<String>) -> Self {
        Self {
            selector: Selector::EventClass(event_class.into()),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Subscribe to one concrete event type of the sum type `E`. The event
    /// class segment is derived from `E`, so it cannot contradict the name.
    pub fn for_event<E: DomainEvent>(event_name: impl Into<String>) -> Self {
        Self {
            selector: Selector::Event {
                event_class: E::EVENT_CLASS,
                event_name: event_name.into(),
            },
            entity_type: None,
            entity_id: None,
        }
    }

    /// Narrow the subscription to one aggregate type.
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Narrow the subscription to one aggregate instance.
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// The channel address this subscription listens on.
    pub fn channel(&self) -> String {
        let (event_class, event_name) = match &self.selector {
            Selector::EventClass(class) => (class.as_str(), None),
            Selector::Event {
                event_class,
                event_name,
            } => (*event_class, Some(event_name.as_str())),
        };
        channel_pattern(
            Some(event_class),
            self.entity_type.as_deref(),
            self.entity_id.as_deref(),
            event_name,
        )
    }
}

/// Publish/subscribe client over one NATS connection per process.
///
/// `connect`/`disconnect` are idempotent. Publishing requires the client to
/// be ready (connected and not draining) and fails fast otherwise; delivery
/// is at-least-once with no transactional coupling to the database write.
pub struct EventStoreClient {
    url: String,
    client: Option<async_nats::Client>,
    draining: bool,
    /// Drain handle for the single tracked subscription, if any.
    active: Option<watch::Sender<bool>>,
}

impl EventStoreClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: None,
            draining: false,
            active: None,
        }
    }

    /// Connect to the bus. A no-op when already connected.
    pub async fn connect(&mut self) -> Result<(), EventStoreError> {
        if let Some(client) = &self.client {
            if client.connection_state() == State::Connected {
                return Ok(());
            }
        }
        let client = async_nats::connect(&self.url).await?;
        info!(url = %self.url, "connected to event store");
        self.client = Some(client);
        self.draining = false;
        Ok(())
    }

    /// Flush and drop the connection. A no-op when not connected.
    pub async fn disconnect(&mut self) -> Result<(), EventStoreError> {
        self.draining = true;
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        if client.connection_state() == State::Connected {
            client.flush().await?;
        }
        info!("disconnected from event store");
        Ok(())
    }

    /// Connected and not draining.
    pub fn is_ready(&self) -> bool {
        self.ready_client().is_ok()
    }

    fn ready_client(&self) -> Result<&async_nats::Client, EventStoreError> {
        match &self.client {
            Some(client) if !self.draining && client.connection_state() == State::Connected => {
                Ok(client)
            }
            _ => Err(EventStoreError::NotReady),
        }
    }

    /// Publish a drained batch, each event to its fully-qualified channel,
    /// in batch order. Stamps `published_at` on first publication.
    pub async fn publish_batch<E: DomainEvent>(
        &self,
        batch: &mut [E],
    ) -> Result<(), EventStoreError> {
        let client = self.ready_client()?;
        for event in batch.iter_mut() {
            let channel = event.channel();
            let payload = event.serialize()?;
            debug!(
                %channel,
                event_id = %event.meta().event_id,
                "publishing event"
            );
            client.publish(channel, payload.into()).await?;
        }
        Ok(())
    }

    /// Open one live subscription, yielding a lazy, unbounded,
    /// non-restartable sequence of decoded events. A second call replaces
    /// the tracked subscription: the previous stream is told to drain.
    pub async fn subscribe<E: DomainEvent>(
        &mut self,
        subscription: &Subscription,
    ) -> Result<EventStream<E>, EventStoreError> {
        let channel = subscription.channel();
        let subscriber = self.ready_client()?.subscribe(channel.clone()).await?;
        let (drain_tx, drain_rx) = watch::channel(false);
        if let Some(previous) = self.active.replace(drain_tx) {
            let _ = previous.send(true);
        }
        info!(%channel, "subscribed to event store");
        Ok(EventStream {
            subscriber,
            drain: drain_rx,
            _marker: PhantomData,
        })
    }

    /// Drain the active subscription, if any: it stops accepting new
    /// messages and finishes what is in flight.
    pub fn close_subscriptions(&mut self) {
        if let Some(active) = self.active.take() {
            let _ = active.send(true);
        }
    }
}

/// A live subscription decoding incoming messages into the sum type `E`.
///
/// Messages whose event-name segment is not a known variant of `E` are
/// skipped silently (forward compatibility), as are payloads that fail to
/// decode.
pub struct EventStream<E> {
    subscriber: async_nats::Subscriber,
    drain: watch::Receiver<bool>,
    _marker: PhantomData<E>,
}

impl<E: DomainEvent> EventStream<E> {
    /// Next decoded event, or `None` once the stream has drained or the
    /// connection is gone.
    pub async fn next(&mut self) -> Option<E> {
        loop {
            tokio::select! {
                changed = self.drain.changed() => {
                    if changed.is_err() || *self.drain.borrow() {
                        let _ = self.subscriber.unsubscribe().await;
                        return None;
                    }
                }
                message = self.subscriber.next() => {
                    let message = message?;
                    match E::deserialize(&message.payload) {
                        Ok(event) => return Some(event),
                        Err(EventStoreError::UnknownEventName(name)) => {
                            debug!(subject = %message.subject, %name, "skipping unrecognized event type");
                        }
                        Err(err) => {
                            warn!(subject = %message.subject, error = %err, "skipping undecodable event payload");
                        }
                    }
                }
            }
        }
    }
}
