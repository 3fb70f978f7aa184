//! The engine's two exposed operations: record and query.
//!
//! Both are thin orchestrations over the store boundary: recording
//! validates and appends, querying recomputes fresh from a store snapshot.
//! There is no cached aggregation state anywhere; concurrent queries never
//! interfere.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::aggregate::{MetricsSnapshot, aggregate};
use crate::event::{EventDraft, EventRecord};
use crate::series::{DayBucket, Window, build_series};
use crate::store::{EventStore, StoreError};
use crate::types::{OwnerId, ValidationError};

/// Errors surfaced by the exposed operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid input to `record_event`; nothing was appended.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Store failure, propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cumulative metrics plus the chart-ready day series for one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub metrics: MetricsSnapshot,
    pub series: Vec<DayBucket>,
}

/// Validates and appends a new event.
///
/// The store assigns `id` and `created_at`. Validation failures are
/// reported before the store is touched. This does not recompute any
/// aggregates; the query path always recomputes fresh.
pub fn record_event<S: EventStore + ?Sized>(
    store: &mut S,
    owner_id: &str,
    name: &str,
    value: Option<f64>,
    category: Option<String>,
    metadata: Map<String, Value>,
) -> Result<EventRecord, EngineError> {
    let owner_id = OwnerId::new(owner_id)?;
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { value }.into());
        }
    }
    let draft = EventDraft {
        owner_id,
        name: name.to_string(),
        category,
        value,
        metadata,
    };
    Ok(store.append(draft)?)
}

/// Recomputes analytics for `owner` over `window` ending today (UTC).
pub fn query_analytics<S: EventStore + ?Sized>(
    store: &S,
    owner: &OwnerId,
    window: Window,
) -> Result<AnalyticsReport, EngineError> {
    query_analytics_at(store, owner, window, Utc::now().date_naive())
}

/// Like [`query_analytics`] with an explicit end day, for deterministic
/// callers and tests.
pub fn query_analytics_at<S: EventStore + ?Sized>(
    store: &S,
    owner: &OwnerId,
    window: Window,
    today: NaiveDate,
) -> Result<AnalyticsReport, EngineError> {
    let start = window.start_day(today);
    let since = start.and_time(NaiveTime::MIN).and_utc();
    let mut events = store.query_range(owner, since)?;
    // The snapshot and the series must come from the identical subset, so
    // clock-skewed rows outside the day range are dropped before
    // aggregation, not just at bucket assignment.
    events.retain(|event| window.contains(today, event.created_at.date_naive()));
    let aggregation = aggregate(&events);
    let series = build_series(window, today, &aggregation.days);
    Ok(AnalyticsReport {
        metrics: aggregation.totals,
        series,
    })
}
