//! Core aggregation engine for pulse usage analytics.
//!
//! This crate contains the fundamental types and logic for:
//! - Dispatch: mapping one event to its metric deltas
//! - Aggregation: folding an event set into cumulative and per-day totals
//! - Series building: gap-free trailing-window day series for charting
//! - Recording: validated appends through the [`store::EventStore`] boundary

pub mod aggregate;
pub mod dispatch;
pub mod engine;
pub mod event;
pub mod series;
pub mod store;
pub mod types;

pub use aggregate::{Aggregation, DayTotals, MetricsSnapshot, aggregate};
pub use dispatch::{MetricDelta, dispatch};
pub use engine::{
    AnalyticsReport, EngineError, query_analytics, query_analytics_at, record_event,
};
pub use event::{
    EventDraft, EventKind, EventRecord, LISTENER_ID_KEY, UnknownEventKind, UsageEvent,
};
pub use series::{DayBucket, UnknownWindow, Window, build_series};
pub use store::{EventStore, StoreError};
pub use types::{EventId, OwnerId, ValidationError};
