//! Domain event envelope and wire codec.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::EventStoreError;

/// Envelope state shared by every event variant.
///
/// Identity and timestamps live here; the type-specific payload lives in the
/// enum variant that embeds this struct. `published_at` stays unset until the
/// event is first serialized for the bus and is held fixed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    pub event_id: Uuid,
    pub entity_id: String,
    pub event_created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl EventMeta {
    /// Create a fresh envelope for a newly emitted event.
    ///
    /// # Panics
    ///
    /// Panics when `entity_id` is empty: an event without an owning
    /// aggregate is a programming error, not a recoverable case.
    pub fn new(entity_id: impl Into<String>) -> Self {
        let entity_id = entity_id.into();
        assert!(
            !entity_id.is_empty(),
            "event envelope requires a non-empty entity id"
        );
        Self {
            event_id: Uuid::new_v4(),
            entity_id,
            event_created_at: Utc::now(),
            published_at: None,
        }
    }
}

/// The envelope header as it appears on the wire. Timestamps are encoded as
/// epoch milliseconds; `event_type` carries the broad event class while
/// `event_name` names the concrete variant.
#[derive(Debug, Serialize, Deserialize)]
struct WireHead {
    event_id: Uuid,
    event_type: String,
    event_name: String,
    entity_id: String,
    entity_type: String,
    event_created_at: i64,
    published_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireEnvelope {
    head: WireHead,
    body: Value,
}

fn datetime_from_millis(ms: i64) -> Result<DateTime<Utc>, EventStoreError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(EventStoreError::InvalidTimestamp(ms))
}

/// A closed sum type of events emitted by one aggregate type.
///
/// Each aggregate defines one enum implementing this trait; the
/// `from_parts` registry maps a variant tag back to its decoder, so adding
/// an event variant without wiring its decoder is a compile-time omission
/// rather than a runtime surprise.
pub trait DomainEvent: Sized + Send + Sync {
    /// Broad category tag, second segment of the bus channel.
    const EVENT_CLASS: &'static str = "entity";

    /// Aggregate type tag, third segment of the bus channel.
    const ENTITY_TYPE: &'static str;

    fn meta(&self) -> &EventMeta;

    fn meta_mut(&mut self) -> &mut EventMeta;

    /// Concrete variant tag, e.g. `TaskCreated`.
    fn event_name(&self) -> &'static str;

    /// Type-specific payload (the `body` half of the wire envelope).
    fn body(&self) -> Result<Value, EventStoreError>;

    /// Decode a variant from its tag, envelope and payload. Returns `None`
    /// for unrecognized tags or payloads that do not match the tag's shape.
    fn from_parts(event_name: &str, meta: EventMeta, body: Value) -> Option<Self>;

    fn entity_id(&self) -> &str {
        &self.meta().entity_id
    }

    /// Fully-qualified publish channel for this event.
    fn channel(&self) -> String {
        format!(
            "events.{}.{}.{}.{}",
            Self::EVENT_CLASS,
            Self::ENTITY_TYPE,
            self.entity_id(),
            self.event_name()
        )
    }

    /// Encode the event as a self-describing wire payload.
    ///
    /// Stamps `published_at` on the first call; later calls reuse the same
    /// instant, so the serialized form is stable once published.
    fn serialize(&mut self) -> Result<Vec<u8>, EventStoreError> {
        let published_at = *self.meta_mut().published_at.get_or_insert_with(Utc::now);
        let meta = self.meta();
        let envelope = WireEnvelope {
            head: WireHead {
                event_id: meta.event_id,
                event_type: Self::EVENT_CLASS.to_string(),
                event_name: self.event_name().to_string(),
                entity_id: meta.entity_id.clone(),
                entity_type: Self::ENTITY_TYPE.to_string(),
                event_created_at: meta.event_created_at.timestamp_millis(),
                published_at: published_at.timestamp_millis(),
            },
            body: self.body()?,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Exact inverse of [`DomainEvent::serialize`] given the emitting sum
    /// type. Fields ending in a time suffix are decoded back from epoch
    /// milliseconds.
    fn deserialize(raw: &[u8]) -> Result<Self, EventStoreError> {
        let envelope: WireEnvelope = serde_json::from_slice(raw)?;
        let meta = EventMeta {
            event_id: envelope.head.event_id,
            entity_id: envelope.head.entity_id.clone(),
            event_created_at: datetime_from_millis(envelope.head.event_created_at)?,
            published_at: Some(datetime_from_millis(envelope.head.published_at)?),
        };
        Self::from_parts(&envelope.head.event_name, meta, envelope.body)
            .ok_or(EventStoreError::UnknownEventName(envelope.head.event_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum ProbeEvent {
        Fired { meta: EventMeta, payload: String },
    }

    #[derive(Serialize, Deserialize)]
    struct FiredBody {
        payload: String,
    }

    impl DomainEvent for ProbeEvent {
        const ENTITY_TYPE: &'static str = "Probe";

        fn meta(&self) -> &EventMeta {
            match self {
                Self::Fired { meta, .. } => meta,
            }
        }

        fn meta_mut(&mut self) -> &mut EventMeta {
            match self {
                Self::Fired { meta, .. } => meta,
            }
        }

        fn event_name(&self) -> &'static str {
            "ProbeFired"
        }

        fn body(&self) -> Result<Value, EventStoreError> {
            match self {
                Self::Fired { payload, .. } => Ok(serde_json::to_value(FiredBody {
                    payload: payload.clone(),
                })?),
            }
        }

        fn from_parts(event_name: &str, meta: EventMeta, body: Value) -> Option<Self> {
            match event_name {
                "ProbeFired" => {
                    let body: FiredBody = serde_json::from_value(body).ok()?;
                    Some(Self::Fired {
                        meta,
                        payload: body.payload,
                    })
                }
                _ => None,
            }
        }
    }

    fn probe() -> ProbeEvent {
        ProbeEvent::Fired {
            meta: EventMeta::new("p1"),
            payload: "hello".to_string(),
        }
    }

    #[test]
    #[should_panic(expected = "non-empty entity id")]
    fn empty_entity_id_is_fatal() {
        let _ = EventMeta::new("");
    }

    #[test]
    fn serialize_stamps_published_at_exactly_once() {
        let mut event = probe();
        assert!(event.meta().published_at.is_none());

        let first = event.serialize().unwrap();
        let stamped = event.meta().published_at.expect("set on first serialize");

        let second = event.serialize().unwrap();
        assert_eq!(event.meta().published_at, Some(stamped));
        assert_eq!(first, second);
    }

    #[test]
    fn round_trip_is_stable() {
        let mut event = probe();
        let raw = event.serialize().unwrap();
        let mut decoded = ProbeEvent::deserialize(&raw).unwrap();
        assert_eq!(decoded.serialize().unwrap(), raw);
    }

    #[test]
    fn round_trip_preserves_identity_and_payload() {
        let mut event = probe();
        let raw = event.serialize().unwrap();
        let decoded = ProbeEvent::deserialize(&raw).unwrap();

        assert_eq!(decoded.meta().event_id, event.meta().event_id);
        assert_eq!(decoded.entity_id(), "p1");
        assert_eq!(decoded.meta().published_at, event.meta().published_at);
        match decoded {
            ProbeEvent::Fired { payload, .. } => assert_eq!(payload, "hello"),
        }
    }

    #[test]
    fn wire_envelope_shape() {
        let mut event = probe();
        let raw = event.serialize().unwrap();
        let value: Value = serde_json::from_slice(&raw).unwrap();

        assert_eq!(value["head"]["event_type"], "entity");
        assert_eq!(value["head"]["event_name"], "ProbeFired");
        assert_eq!(value["head"]["entity_type"], "Probe");
        assert_eq!(value["head"]["entity_id"], "p1");
        assert!(value["head"]["event_created_at"].is_i64());
        assert!(value["head"]["published_at"].is_i64());
        assert_eq!(value["body"]["payload"], "hello");
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let mut event = probe();
        let raw = event.serialize().unwrap();
        let mut value: Value = serde_json::from_slice(&raw).unwrap();
        value["head"]["event_name"] = Value::String("ProbeVanished".to_string());
        let raw = serde_json::to_vec(&value).unwrap();

        match ProbeEvent::deserialize(&raw) {
            Err(EventStoreError::UnknownEventName(name)) => assert_eq!(name, "ProbeVanished"),
            other => panic!("expected UnknownEventName, got {other:?}"),
        }
    }

    #[test]
    fn channel_address_is_fully_qualified() {
        let event = probe();
        assert_eq!(event.channel(), "events.entity.Probe.p1.ProbeFired");
    }
}
