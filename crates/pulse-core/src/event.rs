//! Usage event records and the recognized event vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{EventId, OwnerId};

/// Metadata key carrying the listener identity on `track_play` events.
pub const LISTENER_ID_KEY: &str = "listener_id";

/// An immutable usage fact recorded for one owner.
///
/// Records are append-only: once the store has assigned `id` and
/// `created_at` they are never updated or deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier, assigned by the store at append time.
    pub id: EventId,
    /// The account the event belongs to.
    pub owner_id: OwnerId,
    /// Event name, stored verbatim. Only names listed in [`EventKind`]
    /// carry metric weight; anything else is kept but inert.
    pub name: String,
    /// Free-form classification label, stored but not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Currency amount for payment events, gem count for gem events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Open string-keyed mapping; only `listener_id` is interpreted.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Assigned by the store at append time; determines bucket membership
    /// by UTC calendar-day truncation.
    pub created_at: DateTime<Utc>,
}

/// A new event before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// The event names the metric dispatcher recognizes.
///
/// Single source of truth for the name strings; dispatch matches on the
/// parsed variant so the table stays exhaustiveness-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TrackPlay,
    Purchase,
    ServicePayment,
    GemGiven,
    GemReceived,
    Like,
    Share,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TrackPlay => "track_play",
            Self::Purchase => "purchase",
            Self::ServicePayment => "service_payment",
            Self::GemGiven => "gem_given",
            Self::GemReceived => "gem_received",
            Self::Like => "like",
            Self::Share => "share",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track_play" => Ok(Self::TrackPlay),
            "purchase" => Ok(Self::Purchase),
            "service_payment" => Ok(Self::ServicePayment),
            "gem_given" => Ok(Self::GemGiven),
            "gem_received" => Ok(Self::GemReceived),
            "like" => Ok(Self::Like),
            "share" => Ok(Self::Share),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

/// Error type for event names outside the recognized vocabulary.
///
/// Not an error at aggregation time: unrecognized names are stored and
/// silently contribute no metric.
#[derive(Debug, Clone)]
pub struct UnknownEventKind(String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event kind: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}

/// Access to the fields aggregation cares about.
///
/// This trait allows aggregation to work with different event
/// representations (e.g., stored records from pulse-db, or test fixtures).
pub trait UsageEvent {
    /// Returns the event name (e.g., "`track_play`").
    fn name(&self) -> &str;

    /// Returns the event value, if one was supplied.
    fn value(&self) -> Option<f64>;

    /// Returns the listener identity from metadata, if present.
    fn listener_id(&self) -> Option<&str>;

    /// Returns when the event was created.
    fn created_at(&self) -> DateTime<Utc>;
}

impl UsageEvent for EventRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Option<f64> {
        self.value
    }

    fn listener_id(&self) -> Option<&str> {
        self.metadata.get(LISTENER_ID_KEY).and_then(Value::as_str)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> EventRecord {
        let mut metadata = Map::new();
        metadata.insert(LISTENER_ID_KEY.to_string(), json!("listener-a"));
        EventRecord {
            id: EventId::new("event-1").unwrap(),
            owner_id: OwnerId::new("artist-1").unwrap(),
            name: "track_play".to_string(),
            category: Some("engagement".to_string()),
            value: None,
            metadata,
            created_at: "2025-06-01T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = sample_record();

        let json = serde_json::to_string(&event).unwrap();
        let parsed: EventRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.owner_id, event.owner_id);
        assert_eq!(parsed.name, event.name);
        assert_eq!(parsed.listener_id(), Some("listener-a"));
    }

    #[test]
    fn event_rejects_empty_owner() {
        let json = r#"{
            "id": "event-1",
            "owner_id": "",
            "name": "track_play",
            "created_at": "2025-06-01T12:00:00Z"
        }"#;
        let result: Result<EventRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn kind_roundtrip_all_variants() {
        let variants = [
            EventKind::TrackPlay,
            EventKind::Purchase,
            EventKind::ServicePayment,
            EventKind::GemGiven,
            EventKind::GemReceived,
            EventKind::Like,
            EventKind::Share,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed: EventKind = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn unknown_kind_errors() {
        let result: Result<EventKind, _> = "unknown_kind".parse();
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown event kind: unknown_kind");
    }

    #[test]
    fn listener_id_ignores_non_string_values() {
        let mut event = sample_record();
        event
            .metadata
            .insert(LISTENER_ID_KEY.to_string(), json!(42));
        assert_eq!(event.listener_id(), None);
    }

    #[test]
    fn listener_id_absent_without_metadata() {
        let mut event = sample_record();
        event.metadata = Map::new();
        assert_eq!(event.listener_id(), None);
    }
}
