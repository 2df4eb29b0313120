use chrono::{Datelike, Months, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::duration::{CalendarDuration, MS_PER_DAY, TimeUnit};
use crate::core::format::{FormatContext, SlotLabelFormat};
use crate::core::range::DateRange;

/// Calendar arithmetic and label formatting used by every timeline component.
///
/// Dates are timezone-free markers, so a day is always 24 hours and
/// sub-day arithmetic is plain millisecond arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateEnv {
    pub first_day: Weekday,
    pub week_text: String,
}

impl Default for DateEnv {
    fn default() -> Self {
        Self {
            first_day: Weekday::Mon,
            week_text: "W".to_owned(),
        }
    }
}

impl DateEnv {
    #[must_use]
    pub fn new(first_day: Weekday) -> Self {
        Self {
            first_day,
            ..Self::default()
        }
    }

    /// Adds years and months on the calendar (clamping to month end), then
    /// days, then milliseconds. Saturates at the representable bounds.
    #[must_use]
    pub fn add(&self, date: NaiveDateTime, duration: CalendarDuration) -> NaiveDateTime {
        let total_months = i64::from(duration.years) * 12 + i64::from(duration.months);
        let shifted = match u32::try_from(total_months.unsigned_abs()) {
            Ok(0) => Some(date),
            Ok(months) if total_months > 0 => date.checked_add_months(Months::new(months)),
            Ok(months) => date.checked_sub_months(Months::new(months)),
            Err(_) => None,
        };
        let Some(shifted) = shifted else {
            return saturated(total_months);
        };

        let delta = TimeDelta::try_days(i64::from(duration.days))
            .zip(TimeDelta::try_milliseconds(duration.milliseconds))
            .and_then(|(days, ms)| days.checked_add(&ms));
        match delta.and_then(|delta| shifted.checked_add_signed(delta)) {
            Some(result) => result,
            None => saturated(
                i64::from(duration.days)
                    .saturating_mul(MS_PER_DAY)
                    .saturating_add(duration.milliseconds),
            ),
        }
    }

    #[must_use]
    pub fn add_days(&self, date: NaiveDateTime, days: i32) -> NaiveDateTime {
        self.add(date, CalendarDuration::days(days))
    }

    #[must_use]
    pub fn add_ms(&self, date: NaiveDateTime, ms: i64) -> NaiveDateTime {
        self.add(date, CalendarDuration::milliseconds(ms))
    }

    #[must_use]
    pub fn start_of_day(&self, date: NaiveDateTime) -> NaiveDateTime {
        date.date().and_time(NaiveTime::MIN)
    }

    /// Floors `date` to the start of `unit`. Weeks start on `first_day`.
    #[must_use]
    pub fn start_of(&self, date: NaiveDateTime, unit: TimeUnit) -> NaiveDateTime {
        let day = date.date();
        match unit {
            TimeUnit::Year => day
                .with_ordinal(1)
                .map_or(date, |first| first.and_time(NaiveTime::MIN)),
            TimeUnit::Month => day
                .with_day(1)
                .map_or(date, |first| first.and_time(NaiveTime::MIN)),
            TimeUnit::Week => {
                let offset = (day.weekday().num_days_from_monday() + 7
                    - self.first_day.num_days_from_monday())
                    % 7;
                self.add_days(self.start_of_day(date), -(offset as i32))
            }
            TimeUnit::Day => self.start_of_day(date),
            TimeUnit::Hour => truncate(date, 3_600),
            TimeUnit::Minute => truncate(date, 60),
            TimeUnit::Second => truncate(date, 1),
            TimeUnit::Millisecond => date
                .with_nanosecond(date.nanosecond() / 1_000_000 * 1_000_000)
                .unwrap_or(date),
        }
    }

    /// Whole calendar years between the dates, or `None` when the dates do
    /// not share month, day and time of day.
    #[must_use]
    pub fn diff_whole_years(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<i64> {
        (time_of_day_ms(start) == time_of_day_ms(end)
            && start.day() == end.day()
            && start.month() == end.month())
        .then(|| i64::from(end.year() - start.year()))
    }

    /// Whole calendar months between the dates, or `None` when the dates do
    /// not share day of month and time of day.
    #[must_use]
    pub fn diff_whole_months(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<i64> {
        (time_of_day_ms(start) == time_of_day_ms(end) && start.day() == end.day()).then(|| {
            i64::from(end.year() - start.year()) * 12 + i64::from(end.month())
                - i64::from(start.month())
        })
    }

    #[must_use]
    pub fn diff_whole_days(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<i64> {
        let ms = (end - start).num_milliseconds();
        (ms % MS_PER_DAY == 0).then_some(ms / MS_PER_DAY)
    }

    /// How many `duration`s fit between the dates, possibly fractional.
    ///
    /// Calendar units are compared on the calendar first (so a month-long
    /// range holds exactly one `{ months: 1 }` regardless of its day count);
    /// otherwise the rough millisecond ratio is used.
    #[must_use]
    pub fn count_durations_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        duration: CalendarDuration,
    ) -> f64 {
        if duration.years != 0 {
            if let Some(diff) = self.diff_whole_years(start, end) {
                return diff as f64 / duration.as_rough_years();
            }
        }
        if duration.months != 0 {
            if let Some(diff) = self.diff_whole_months(start, end) {
                return diff as f64 / duration.as_rough_months();
            }
        }
        if duration.days != 0 {
            if let Some(diff) = self.diff_whole_days(start, end) {
                return diff as f64 / duration.as_rough_days();
            }
        }
        (end - start).num_milliseconds() as f64 / duration.as_rough_ms()
    }

    #[must_use]
    pub fn week_number(&self, date: NaiveDateTime) -> u32 {
        date.iso_week().week()
    }

    /// Expands a timed range to the whole days it visibly covers.
    ///
    /// An end past midnight only claims its day once it reaches
    /// `next_day_threshold`; a range that would end on or before its start
    /// day covers exactly that day.
    #[must_use]
    pub fn visible_day_range(
        &self,
        range: DateRange,
        next_day_threshold: CalendarDuration,
    ) -> DateRange {
        let start = self.start_of_day(range.start);
        let mut end = self.start_of_day(range.end);
        let end_time_ms = time_of_day_ms(range.end);
        if end_time_ms != 0 && end_time_ms as f64 >= next_day_threshold.as_rough_ms() {
            end = self.add_days(end, 1);
        }
        if end <= start {
            end = self.add_days(start, 1);
        }
        DateRange { start, end }
    }

    #[must_use]
    pub fn format(&self, date: NaiveDateTime, format: &SlotLabelFormat) -> String {
        format.render(&FormatContext {
            date,
            week_number: self.week_number(date),
            week_text: self.week_text.clone(),
        })
    }
}

/// Milliseconds elapsed since the start of the date's day.
#[must_use]
pub fn time_of_day_ms(date: NaiveDateTime) -> i64 {
    i64::from(date.num_seconds_from_midnight()) * 1_000 + i64::from(date.nanosecond() / 1_000_000)
}

fn truncate(date: NaiveDateTime, step_seconds: u32) -> NaiveDateTime {
    let seconds = date.num_seconds_from_midnight();
    let floored = seconds - seconds % step_seconds;
    NaiveTime::from_num_seconds_from_midnight_opt(floored, 0)
        .map_or(date, |time| date.date().and_time(time))
}

fn saturated(direction: i64) -> NaiveDateTime {
    if direction < 0 {
        NaiveDateTime::MIN
    } else {
        NaiveDateTime::MAX
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, Weekday};

    use super::DateEnv;
    use crate::core::duration::{CalendarDuration, TimeUnit};
    use crate::core::range::DateRange;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|day| day.and_hms_opt(h, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn month_addition_follows_calendar() {
        let env = DateEnv::default();
        assert_eq!(
            env.add(at(2020, 1, 1, 0), CalendarDuration::months(1)),
            at(2020, 2, 1, 0)
        );
        assert_eq!(
            env.add(at(2020, 2, 1, 0), CalendarDuration::years(1)),
            at(2021, 2, 1, 0)
        );
        assert_eq!(
            env.add(at(2020, 3, 1, 0), CalendarDuration::months(-1)),
            at(2020, 2, 1, 0)
        );
    }

    #[test]
    fn overflowing_offsets_saturate() {
        let env = DateEnv::default();
        let huge = CalendarDuration {
            days: i32::MAX,
            milliseconds: i64::MAX,
            ..CalendarDuration::ZERO
        };
        assert_eq!(env.add(at(2020, 1, 1, 0), huge), NaiveDateTime::MAX);

        let tiny = CalendarDuration {
            days: i32::MIN,
            milliseconds: -i64::MAX,
            ..CalendarDuration::ZERO
        };
        assert_eq!(env.add(at(2020, 1, 1, 0), tiny), NaiveDateTime::MIN);
    }

    #[test]
    fn start_of_week_respects_first_day() {
        let monday_env = DateEnv::new(Weekday::Mon);
        let sunday_env = DateEnv::new(Weekday::Sun);
        // 2020-04-08 is a Wednesday.
        assert_eq!(
            monday_env.start_of(at(2020, 4, 8, 15), TimeUnit::Week),
            at(2020, 4, 6, 0)
        );
        assert_eq!(
            sunday_env.start_of(at(2020, 4, 8, 15), TimeUnit::Week),
            at(2020, 4, 5, 0)
        );
    }

    #[test]
    fn count_durations_prefers_calendar_diffs() {
        let env = DateEnv::default();
        let months = env.count_durations_between(
            at(2020, 1, 1, 0),
            at(2020, 3, 1, 0),
            CalendarDuration::months(1),
        );
        assert_eq!(months, 2.0);

        let hours = env.count_durations_between(
            at(2020, 1, 1, 0),
            at(2020, 1, 2, 0),
            CalendarDuration::hours(1),
        );
        assert_eq!(hours, 24.0);
    }

    #[test]
    fn visible_day_range_claims_partial_end_day() {
        let env = DateEnv::default();
        let range = DateRange {
            start: at(2020, 1, 1, 10),
            end: at(2020, 1, 2, 2),
        };
        let days = env.visible_day_range(range, CalendarDuration::ZERO);
        assert_eq!(days.start, at(2020, 1, 1, 0));
        assert_eq!(days.end, at(2020, 1, 3, 0));

        let threshold = env.visible_day_range(range, CalendarDuration::hours(9));
        assert_eq!(threshold.end, at(2020, 1, 2, 0));
    }
}
