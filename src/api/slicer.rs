use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::api::timeline_profile::TimelineDateProfile;
use crate::core::{CalendarDuration, DateEnv, DateRange, HiddenDayPredicate};

/// Visible part of a range, flagged where it keeps the range's true edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_start: bool,
    pub is_end: bool,
}

impl TimelineSegment {
    #[must_use]
    pub fn range(self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }
}

/// Clips event, selection and background ranges to a timeline grid.
#[derive(Clone, Copy)]
pub struct TimelineSlicer<'a> {
    profile: &'a TimelineDateProfile,
    env: &'a DateEnv,
    hidden: &'a dyn HiddenDayPredicate,
    next_day_threshold: CalendarDuration,
}

impl<'a> TimelineSlicer<'a> {
    #[must_use]
    pub fn new(
        profile: &'a TimelineDateProfile,
        env: &'a DateEnv,
        hidden: &'a dyn HiddenDayPredicate,
    ) -> Self {
        Self {
            profile,
            env,
            hidden,
            next_day_threshold: CalendarDuration::ZERO,
        }
    }

    /// Minimum time of day an end must reach to claim its day on date scales.
    #[must_use]
    pub fn with_next_day_threshold(mut self, threshold: CalendarDuration) -> Self {
        self.next_day_threshold = threshold;
        self
    }

    /// Slices `range` against the grid, yielding at most one segment.
    ///
    /// Returns `None` when the range misses the grid or lies entirely inside
    /// hidden days or outside the daily time window.
    #[must_use]
    pub fn slice(&self, range: DateRange) -> Option<TimelineSegment> {
        let profile = self.profile;
        let normal = profile.normalize_range(range, self.env, self.next_day_threshold);

        if profile.snap_coverage(normal.start, self.env)
            >= profile.snap_coverage(normal.end, self.env)
        {
            return None;
        }

        let sliced = normal.intersect(profile.normalized_range)?;
        let last_instant = sliced.end - TimeDelta::milliseconds(1);
        Some(TimelineSegment {
            start: sliced.start,
            end: sliced.end,
            is_start: sliced.start == normal.start
                && profile.is_valid_date(sliced.start, self.hidden),
            is_end: sliced.end == normal.end && profile.is_valid_date(last_instant, self.hidden),
        })
    }

    /// Slices every range, dropping those with no visible part.
    pub fn slice_all<I>(&self, ranges: I) -> Vec<TimelineSegment>
    where
        I: IntoIterator<Item = DateRange>,
    {
        ranges
            .into_iter()
            .filter_map(|range| self.slice(range))
            .collect()
    }
}
