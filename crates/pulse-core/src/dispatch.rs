//! Metric dispatch: one event in, zero or more metric deltas out.

use crate::event::{EventKind, UsageEvent};

/// The metric contribution of a single event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricDelta<'a> {
    pub plays: u64,
    pub revenue: f64,
    pub gems: f64,
    pub likes: u64,
    pub shares: u64,
    /// Listener identity to feed the unique-listener sets, if any.
    pub listener: Option<&'a str>,
}

/// Maps one event to its metric deltas.
///
/// Deterministic, total, side-effect-free: unrecognized names yield an
/// empty delta rather than an error.
///
/// Value handling:
/// - payments: absent value counts as 0, negatives clamp to 0
/// - gems: absent value counts as 1, present values clamp to 0 minimum,
///   so an explicit zero contributes nothing
pub fn dispatch<E: UsageEvent>(event: &E) -> MetricDelta<'_> {
    let mut delta = MetricDelta::default();
    let Ok(kind) = event.name().parse::<EventKind>() else {
        return delta;
    };
    match kind {
        EventKind::TrackPlay => {
            delta.plays = 1;
            delta.listener = event.listener_id();
        }
        EventKind::Purchase | EventKind::ServicePayment => {
            delta.revenue = event.value().unwrap_or(0.0).max(0.0);
        }
        EventKind::GemGiven | EventKind::GemReceived => {
            delta.gems = event.value().map_or(1.0, |value| value.max(0.0));
        }
        EventKind::Like => delta.likes = 1,
        EventKind::Share => delta.shares = 1,
    }
    delta
}
