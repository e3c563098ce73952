//! Time utilities and constants for spendtrack.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// How long a fetched quote snapshot is served before refetching (60 seconds).
    pub fn quote_snapshot_ttl() -> Duration {
        Duration::seconds(60)
    }

    /// Upstream rate feed request timeout (10 seconds).
    pub fn quote_request_timeout() -> Duration {
        Duration::seconds(10)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Duration extensions for convenient construction.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

/// Half-open time range `[start, end)`, used for reporting periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Period {
    /// Create a period; `None` if `end` is not after `start`.
    pub fn new(start: Timestamp, end: Timestamp) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// The calendar month (UTC) containing `ts`.
    pub fn month_containing(ts: Timestamp) -> Self {
        let start = Utc
            .with_ymd_and_hms(ts.year(), ts.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(ts);
        let (year, month) = if ts.month() == 12 {
            (ts.year() + 1, 1)
        } else {
            (ts.year(), ts.month() + 1)
        };
        let end = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .unwrap_or(start + Duration::days(31));
        Self { start, end }
    }

    /// The calendar month before the one this period starts in.
    pub fn previous_month(&self) -> Self {
        Self::month_containing(self.start - Duration::seconds(1))
    }

    /// Whether `ts` falls inside the period.
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
