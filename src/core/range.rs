use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Creates a range, rejecting an end that precedes the start.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> TimelineResult<Self> {
        if end < start {
            return Err(TimelineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn contains(self, date: NaiveDateTime) -> bool {
        self.start <= date && date < self.end
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }

    /// Overlapping part of both ranges, or `None` when they do not overlap.
    #[must_use]
    pub fn intersect(self, other: Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    #[must_use]
    pub fn duration_ms(self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}
