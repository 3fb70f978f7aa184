//! Trailing-window day series with gap filling.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::DayTotals;

/// Caller-selected trailing window, in calendar days ending today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Window {
    Days7,
    #[default]
    Days30,
    Days90,
}

impl Window {
    /// Number of calendar days the window spans.
    pub const fn days(self) -> i64 {
        match self {
            Self::Days7 => 7,
            Self::Days30 => 30,
            Self::Days90 => 90,
        }
    }

    /// First calendar day of the window ending at `today` inclusive.
    pub fn start_day(self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days() - 1)
    }

    /// Whether `day` falls inside the window ending at `today`.
    pub fn contains(self, today: NaiveDate, day: NaiveDate) -> bool {
        day >= self.start_day(today) && day <= today
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

impl FromStr for Window {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7" | "7d" => Ok(Self::Days7),
            "30" | "30d" => Ok(Self::Days30),
            "90" | "90d" => Ok(Self::Days90),
            _ => Err(UnknownWindow(s.to_string())),
        }
    }
}

/// Error type for window strings outside the supported set.
#[derive(Debug, Clone, Error)]
#[error("unsupported window {0:?}, expected 7d, 30d, or 90d")]
pub struct UnknownWindow(String);

/// One calendar day in a window series.
///
/// Present for every day of the window, zero-filled when no events fell on
/// that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub plays: u64,
    pub revenue: f64,
    pub gems: f64,
    pub likes: u64,
    pub shares: u64,
    pub unique_listeners_count: u64,
}

impl DayBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            plays: 0,
            revenue: 0.0,
            gems: 0.0,
            likes: 0,
            shares: 0,
            unique_listeners_count: 0,
        }
    }

    fn from_totals(date: NaiveDate, totals: &DayTotals) -> Self {
        Self {
            date,
            plays: totals.plays,
            revenue: totals.revenue,
            gems: totals.gems,
            likes: totals.likes,
            shares: totals.shares,
            unique_listeners_count: totals.unique_listeners_count,
        }
    }
}

/// Builds the gap-free series for `window` ending at `today` inclusive.
///
/// Exactly `window.days()` buckets, ascending by date (oldest first) --
/// the store hands events back newest-first, so the ordering here is
/// deliberate and tested.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn build_series(
    window: Window,
    today: NaiveDate,
    days: &BTreeMap<NaiveDate, DayTotals>,
) -> Vec<DayBucket> {
    window
        .start_day(today)
        .iter_days()
        .take(window.days() as usize)
        .map(|date| {
            days.get(&date)
                .map_or_else(|| DayBucket::empty(date), |totals| DayBucket::from_totals(date, totals))
        })
        .collect()
}
