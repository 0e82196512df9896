//! Time window model.
//!
//! # Time Model
//! All instants are milliseconds since the Unix epoch (UTC). Calendar
//! questions (hour of day, weekend) are answered through `chrono`.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Milliseconds per minute.
pub const MINUTE_MS: i64 = 60_000;
/// Milliseconds per hour.
pub const HOUR_MS: i64 = 3_600_000;

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end. Used by allocations
/// and by berth maintenance / blackout records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    /// Interval start (ms, inclusive).
    pub start_ms: i64,
    /// Interval end (ms, exclusive).
    pub end_ms: i64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Does not check `start_ms < end_ms`; snapshots are checked by
    /// [`crate::validation`]. Use [`TimeWindow::try_new`] for untrusted values.
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Creates a window, returning `None` unless `start_ms < end_ms`.
    pub fn try_new(start_ms: i64, end_ms: i64) -> Option<Self> {
        (start_ms < end_ms).then_some(Self { start_ms, end_ms })
    }

    /// Whether `start < end`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start_ms < self.end_ms
    }

    /// Duration of this window (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Whether a timestamp falls within this window.
    #[inline]
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }

    /// Whether two windows overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    /// Intersection of two windows, if they overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        Self::try_new(
            self.start_ms.max(other.start_ms),
            self.end_ms.min(other.end_ms),
        )
    }

    /// Length of the overlap with `other` in whole minutes (0 if disjoint).
    pub fn overlap_minutes(&self, other: &Self) -> i64 {
        self.intersection(other)
            .map(|w| w.duration_ms() / MINUTE_MS)
            .unwrap_or(0)
    }

    /// The same duration moved to start at `start_ms`.
    ///
    /// Instants saturate at the `i64` range, like [`Self::shifted`] and
    /// [`Self::padded`].
    pub fn starting_at(&self, start_ms: i64) -> Self {
        Self::new(start_ms, start_ms.saturating_add(self.duration_ms()))
    }

    /// Shifted by `delta_ms` (positive = later).
    pub fn shifted(&self, delta_ms: i64) -> Self {
        Self::new(
            self.start_ms.saturating_add(delta_ms),
            self.end_ms.saturating_add(delta_ms),
        )
    }

    /// Widened by `margin_ms` on both sides.
    pub fn padded(&self, margin_ms: i64) -> Self {
        Self::new(
            self.start_ms.saturating_sub(margin_ms),
            self.end_ms.saturating_add(margin_ms),
        )
    }
}

/// Hour of day (0-23, UTC) of an instant.
pub fn hour_of_day(time_ms: i64) -> u32 {
    DateTime::<Utc>::from_timestamp_millis(time_ms)
        .map(|dt| dt.hour())
        .unwrap_or(0)
}

/// Whether an instant falls on a Saturday or Sunday (UTC).
pub fn is_weekend(time_ms: i64) -> bool {
    DateTime::<Utc>::from_timestamp_millis(time_ms)
        .map(|dt| matches!(dt.weekday(), Weekday::Sat | Weekday::Sun))
        .unwrap_or(false)
}

/// Start (ms) of the clock hour containing `time_ms`.
#[inline]
pub fn hour_start(time_ms: i64) -> i64 {
    time_ms.saturating_sub(time_ms.rem_euclid(HOUR_MS))
}

/// Whether an instant is a calendar date `chrono` can represent.
pub fn is_representable(time_ms: i64) -> bool {
    DateTime::<Utc>::from_timestamp_millis(time_ms).is_some()
}
