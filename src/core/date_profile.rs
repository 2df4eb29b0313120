use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::duration::{CalendarDuration, MS_PER_DAY};
use crate::core::range::DateRange;
use crate::error::{TimelineError, TimelineResult};

/// Decides whether a whole day is excluded from the grid.
pub trait HiddenDayPredicate {
    fn is_hidden_day(&self, date: NaiveDateTime) -> bool;
}

impl<F> HiddenDayPredicate for F
where
    F: Fn(NaiveDateTime) -> bool,
{
    fn is_hidden_day(&self, date: NaiveDateTime) -> bool {
        self(date)
    }
}

/// Set of weekdays excluded from the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HiddenDays {
    mask: u8,
}

impl HiddenDays {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds the set, rejecting a configuration that hides every weekday.
    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> TimelineResult<Self> {
        let mask = days
            .into_iter()
            .fold(0u8, |mask, day| mask | (1 << day.num_days_from_monday()));
        if mask == 0b0111_1111 {
            return Err(TimelineError::InvalidConfig(
                "hidden days cannot hide the entire week".to_owned(),
            ));
        }
        Ok(Self { mask })
    }

    #[must_use]
    pub fn hides(self, day: Weekday) -> bool {
        self.mask & (1 << day.num_days_from_monday()) != 0
    }
}

impl HiddenDayPredicate for HiddenDays {
    fn is_hidden_day(&self, date: NaiveDateTime) -> bool {
        self.hides(date.weekday())
    }
}

/// Ranges and daily time window produced by the host's date-profile generator.
///
/// `current_range` is the nominal visible range, `render_range` the range the
/// grid covers, and `active_range` the current range narrowed by the daily
/// `slot_min_time`/`slot_max_time` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateProfile {
    pub current_range: DateRange,
    pub render_range: DateRange,
    pub active_range: DateRange,
    pub slot_min_time: CalendarDuration,
    pub slot_max_time: CalendarDuration,
}

impl DateProfile {
    /// Profile rendering exactly `current_range` with a full-day time window.
    #[must_use]
    pub fn new(current_range: DateRange) -> Self {
        Self {
            current_range,
            render_range: current_range,
            active_range: current_range,
            slot_min_time: CalendarDuration::ZERO,
            slot_max_time: CalendarDuration::days(1),
        }
    }

    #[must_use]
    pub fn with_render_range(mut self, render_range: DateRange) -> Self {
        self.render_range = render_range;
        self
    }

    /// Restricts each day to `[min_time, max_time)`; `max_time` may pass
    /// midnight (e.g. `26:00`).
    pub fn with_slot_time_window(
        mut self,
        min_time: CalendarDuration,
        max_time: CalendarDuration,
    ) -> TimelineResult<Self> {
        let min_ms = min_time.as_rough_ms();
        let max_ms = max_time.as_rough_ms();
        if min_ms < 0.0 || max_ms <= min_ms {
            return Err(TimelineError::InvalidConfig(format!(
                "slot time window must satisfy 0 <= min < max, got [{min_time}, {max_time})"
            )));
        }

        self.slot_min_time = min_time;
        self.slot_max_time = max_time;
        let start = self.current_range.start + chrono::TimeDelta::milliseconds(min_ms as i64);
        let end = self.current_range.end
            + chrono::TimeDelta::milliseconds(max_ms as i64 - MS_PER_DAY);
        self.active_range = DateRange { start, end };
        Ok(self)
    }

    /// Length of the daily visible window in milliseconds.
    #[must_use]
    pub fn time_window_ms(&self) -> i64 {
        (self.slot_max_time.as_rough_ms() - self.slot_min_time.as_rough_ms()) as i64
    }
}
