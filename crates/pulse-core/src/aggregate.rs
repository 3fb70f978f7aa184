//! Window aggregation: a single linear pass over an event set.
//!
//! Input is the full, already-window-filtered sequence of one owner's
//! events; order is not significant. Output is one cumulative
//! [`MetricsSnapshot`] plus per-day partial totals keyed by UTC calendar
//! day. Days without events are absent from the map; the series builder
//! fills those gaps.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dispatch::dispatch;
use crate::event::{EventKind, UsageEvent};

/// Cumulative metrics over an aggregated event set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_plays: u64,
    pub total_revenue: f64,
    pub total_gems: f64,
    pub total_likes: u64,
    pub total_shares: u64,
    /// Distinct `listener_id` values across all `track_play` events.
    pub unique_listeners: u64,
}

/// One day's partial contribution, before gap filling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub plays: u64,
    pub revenue: f64,
    pub gems: f64,
    pub likes: u64,
    pub shares: u64,
    /// Distinct listeners on this day only; sets are not shared across days.
    pub unique_listeners_count: u64,
}

/// Aggregation output: cumulative snapshot plus the days that saw events.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub totals: MetricsSnapshot,
    pub days: BTreeMap<NaiveDate, DayTotals>,
}

/// Folds events into cumulative and per-day totals.
///
/// Single pass, O(n) in event count, O(d) auxiliary space for d distinct
/// days. Order-independent: every accumulator update is commutative.
/// Malformed or unrecognized events degrade to no-ops instead of aborting
/// the pass.
#[allow(clippy::cast_possible_truncation)]
pub fn aggregate<E: UsageEvent>(events: &[E]) -> Aggregation {
    let mut totals = MetricsSnapshot::default();
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    let mut listeners: HashSet<&str> = HashSet::new();
    let mut day_listeners: HashMap<NaiveDate, HashSet<&str>> = HashMap::new();

    for event in events {
        if event.name().parse::<EventKind>().is_err() {
            tracing::debug!(name = event.name(), "event name carries no metric weight");
        }
        let delta = dispatch(event);
        let day = event.created_at().date_naive();

        totals.total_plays += delta.plays;
        totals.total_revenue += delta.revenue;
        totals.total_gems += delta.gems;
        totals.total_likes += delta.likes;
        totals.total_shares += delta.shares;

        let bucket = days.entry(day).or_default();
        bucket.plays += delta.plays;
        bucket.revenue += delta.revenue;
        bucket.gems += delta.gems;
        bucket.likes += delta.likes;
        bucket.shares += delta.shares;

        if let Some(listener) = delta.listener {
            listeners.insert(listener);
            day_listeners.entry(day).or_default().insert(listener);
        }
    }

    totals.unique_listeners = listeners.len() as u64;
    for (day, set) in day_listeners {
        if let Some(bucket) = days.get_mut(&day) {
            bucket.unique_listeners_count = set.len() as u64;
        }
    }

    Aggregation { totals, days }
}
