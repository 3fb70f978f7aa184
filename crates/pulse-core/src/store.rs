//! The event-store collaborator boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::{EventDraft, EventRecord};
use crate::types::OwnerId;

/// Failure inside an event-store implementation.
///
/// Opaque to the engine and propagated to callers unmodified; retry and
/// backoff policy belong to store implementations.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl StoreError {
    /// Wraps a backend error.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

/// Append-only persistence for event records, queryable by owner and
/// creation-time range.
///
/// `query_range` returns events in unspecified order; aggregation must not
/// depend on it.
pub trait EventStore {
    /// Appends a draft, assigning `id` and `created_at`, and returns the
    /// stored record.
    fn append(&mut self, draft: EventDraft) -> Result<EventRecord, StoreError>;

    /// Returns the owner's events created at or after `since`.
    fn query_range(
        &self,
        owner: &OwnerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<EventRecord>, StoreError>;
}
