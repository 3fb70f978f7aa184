//! SQLite event store for pulse.
//!
//! Implements the `pulse-core` [`EventStore`] collaborator with `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization (a
//! `Mutex<Database>`, a pool, or one instance per thread).
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC (e.g.,
//! `2025-06-01T10:30:00.000Z`), so lexicographic ordering matches
//! chronological ordering and range filters can compare strings directly.
//! Metadata is stored as a JSON object in TEXT. Events are append-only:
//! there is no UPDATE or DELETE path.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use pulse_core::event::{EventDraft, EventRecord};
use pulse_core::store::{EventStore, StoreError};
use pulse_core::types::{EventId, OwnerId, ValidationError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored event timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse stored event metadata JSON.
    #[error("invalid metadata for event {event_id}: {message}")]
    MetadataParse { event_id: String, message: String },
    /// A stored row failed domain validation on decode.
    #[error("invalid stored event: {0}")]
    Invalid(#[from] ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Row shape before decoding into an [`EventRecord`].
#[derive(Debug)]
struct EventRow {
    id: String,
    owner_id: String,
    name: String,
    category: Option<String>,
    value: Option<f64>,
    metadata: String,
    created_at: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Events table: append-only usage facts
            -- created_at: RFC 3339 UTC text (e.g., '2025-06-01T10:30:00.000Z')
            -- metadata: JSON object text
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT,
                value REAL,
                metadata TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_owner_created
                ON events(owner_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_events_name ON events(name);
            ",
        )?;
        Ok(())
    }

    /// Appends a draft, assigning a fresh ID and the current UTC instant.
    pub fn append_event(&mut self, draft: EventDraft) -> Result<EventRecord, DbError> {
        self.append_event_at(draft, Utc::now())
    }

    fn append_event_at(
        &mut self,
        draft: EventDraft,
        created_at: DateTime<Utc>,
    ) -> Result<EventRecord, DbError> {
        // Stored text is millisecond precision; the returned record must
        // equal what a later read decodes.
        let created_at = truncate_to_millis(created_at);
        let id = EventId::new(Uuid::new_v4().to_string())?;
        let metadata_text =
            serde_json::to_string(&draft.metadata).map_err(|err| DbError::MetadataParse {
                event_id: id.as_str().to_string(),
                message: err.to_string(),
            })?;

        self.conn.execute(
            "
            INSERT INTO events (id, owner_id, name, category, value, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                id.as_str(),
                draft.owner_id.as_str(),
                draft.name,
                draft.category,
                draft.value,
                metadata_text,
                format_timestamp(created_at),
            ],
        )?;
        tracing::debug!(event_id = %id, owner_id = %draft.owner_id, name = %draft.name, "event appended");

        Ok(EventRecord {
            id,
            owner_id: draft.owner_id,
            name: draft.name,
            category: draft.category,
            value: draft.value,
            metadata: draft.metadata,
            created_at,
        })
    }

    /// Returns the owner's events created at or after `since`, newest first.
    pub fn events_since(
        &self,
        owner: &OwnerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, owner_id, name, category, value, metadata, created_at
            FROM events
            WHERE owner_id = ? AND created_at >= ?
            ORDER BY created_at DESC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![owner.as_str(), format_timestamp(since)], row_to_raw)?;
        collect_events(rows)
    }

    /// Lists all of the owner's events, newest first.
    pub fn list_events(&self, owner: &OwnerId) -> Result<Vec<EventRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, owner_id, name, category, value, metadata, created_at
            FROM events
            WHERE owner_id = ?
            ORDER BY created_at DESC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![owner.as_str()], row_to_raw)?;
        collect_events(rows)
    }
}

impl EventStore for Database {
    fn append(&mut self, draft: EventDraft) -> Result<EventRecord, StoreError> {
        self.append_event(draft).map_err(StoreError::new)
    }

    fn query_range(
        &self,
        owner: &OwnerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, StoreError> {
        self.events_since(owner, since).map_err(StoreError::new)
    }
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        value: row.get(4)?,
        metadata: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn collect_events<I>(rows: I) -> Result<Vec<EventRecord>, DbError>
where
    I: Iterator<Item = rusqlite::Result<EventRow>>,
{
    let mut events = Vec::new();
    for row in rows {
        events.push(decode_row(row?)?);
    }
    Ok(events)
}

fn decode_row(row: EventRow) -> Result<EventRecord, DbError> {
    let created_at = parse_timestamp(&row.created_at, &row.id)?;
    let metadata = parse_metadata(&row.metadata, &row.id)?;
    Ok(EventRecord {
        id: EventId::new(row.id)?,
        owner_id: OwnerId::new(row.owner_id)?,
        name: row.name,
        category: row.category,
        value: row.value,
        metadata,
        created_at,
    })
}

fn parse_timestamp(timestamp: &str, event_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id: event_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn parse_metadata(metadata: &str, event_id: &str) -> Result<Map<String, Value>, DbError> {
    let value: Value = serde_json::from_str(metadata).map_err(|err| DbError::MetadataParse {
        event_id: event_id.to_string(),
        message: err.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DbError::MetadataParse {
            event_id: event_id.to_string(),
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or(timestamp)
}
