//! Timeline date profile: the immutable slot grid rebuilt whenever the
//! visible range or the timeline options change.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::granularity::{GranularityRequest, resolve_granularity};
use crate::api::header_formats::{HeaderFormats, compute_header_formats, current_range_as};
use crate::api::options::TimelineOptions;
use crate::core::{
    CalendarDuration, DateEnv, DateProfile, DateRange, HiddenDayPredicate, MS_PER_DAY, RowUnit,
    TimeUnit, time_of_day_ms,
};
use crate::error::{TimelineError, TimelineResult};

/// Calendar unit that slot boundaries snap to when slots are weeks or longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LargeUnit {
    Year,
    Month,
    Week,
}

impl LargeUnit {
    fn from_time_unit(unit: TimeUnit) -> Option<Self> {
        match unit {
            TimeUnit::Year => Some(Self::Year),
            TimeUnit::Month => Some(Self::Month),
            TimeUnit::Week => Some(Self::Week),
            _ => None,
        }
    }

    #[must_use]
    pub fn time_unit(self) -> TimeUnit {
        match self {
            Self::Year => TimeUnit::Year,
            Self::Month => TimeUnit::Month,
            Self::Week => TimeUnit::Week,
        }
    }
}

/// One header cell spanning `colspan` consecutive slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    pub date: NaiveDateTime,
    pub text: String,
    pub colspan: usize,
    /// Navigation unit of the row, `None` for custom formats.
    pub row_unit: Option<RowUnit>,
    pub is_week_start: bool,
}

/// Resolved slot grid for one visible range.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineDateProfile {
    pub slot_duration: CalendarDuration,
    pub label_interval: CalendarDuration,
    pub snap_duration: CalendarDuration,
    pub snaps_per_slot: u32,
    pub slots_per_label: Option<i64>,
    pub is_time_scale: bool,
    pub large_unit: Option<LargeUnit>,
    pub emphasize_weeks: bool,
    pub slot_min_time: CalendarDuration,
    pub time_window_ms: i64,
    pub normalized_range: DateRange,
    pub slot_dates: Vec<NaiveDateTime>,
    pub is_week_starts: Vec<bool>,
    /// Slot index per snap step from the range start; `n + 0.5` marks a step
    /// that falls between valid slots.
    pub snap_diff_to_index: Vec<f64>,
    /// Snap step offset of every valid snap.
    pub snap_index_to_diff: Vec<usize>,
    pub snap_cnt: usize,
    pub slot_cnt: usize,
    pub header_formats: HeaderFormats,
    pub cell_rows: Vec<Vec<HeaderCell>>,
}

/// Builds the slot grid for `date_profile` under `options`.
///
/// Configuration conflicts fall back with a warning. A snap duration that
/// does not divide the slot duration, or a snap table that does not tile
/// whole slots, is rejected.
pub fn build_timeline_date_profile(
    date_profile: &DateProfile,
    options: &TimelineOptions,
    env: &DateEnv,
    hidden: &dyn HiddenDayPredicate,
) -> TimelineResult<TimelineDateProfile> {
    let current_range = date_profile.current_range;
    let granularity = resolve_granularity(
        current_range,
        GranularityRequest {
            slot_duration: options.slot_duration,
            label_interval: options.slot_label_interval,
            snap_duration: options.snap_duration,
        },
        options.limits,
        env,
    )?;

    let header_formats: HeaderFormats = match &options.slot_label_format {
        Some(formats) => formats.iter().cloned().collect(),
        None => compute_header_formats(
            granularity.label_interval,
            current_range,
            env,
            options.week_numbers,
            options.limits.max_auto_slots_per_label,
        ),
    };

    let slot_duration = granularity.slot_duration;
    let is_time_scale = slot_duration.has_time_part();
    let large_unit = if is_time_scale {
        None
    } else {
        LargeUnit::from_time_unit(slot_duration.greatest_denominator().0)
    };
    let emphasize_weeks = slot_duration.is_single_day()
        && current_range_as(current_range, TimeUnit::Week, env) >= 2
        && !options.business_hours;

    let mut profile = TimelineDateProfile {
        slot_duration,
        label_interval: granularity.label_interval,
        snap_duration: granularity.snap_duration,
        snaps_per_slot: granularity.snaps_per_slot,
        slots_per_label: granularity.label_interval.whole_divide(slot_duration),
        is_time_scale,
        large_unit,
        emphasize_weeks,
        slot_min_time: date_profile.slot_min_time,
        time_window_ms: date_profile.time_window_ms(),
        normalized_range: date_profile.render_range,
        slot_dates: Vec::new(),
        is_week_starts: Vec::new(),
        snap_diff_to_index: Vec::new(),
        snap_index_to_diff: Vec::new(),
        snap_cnt: 0,
        slot_cnt: 0,
        header_formats,
        cell_rows: Vec::new(),
    };

    let render_range = date_profile.render_range;
    let mut start = profile.normalize_date(render_range.start, env);
    let mut end = profile.normalize_date(render_range.end, env);
    if is_time_scale {
        start = env.add(start, date_profile.slot_min_time);
        end = env.add(env.add_days(end, -1), date_profile.slot_max_time);
    }
    profile.normalized_range = DateRange { start, end };

    profile.slot_dates = steps(env, profile.normalized_range, slot_duration)
        .filter(|date| profile.is_valid_date(*date, hidden))
        .collect();

    let mut valid_snaps = 0usize;
    for (diff, date) in steps(env, profile.normalized_range, profile.snap_duration).enumerate() {
        if profile.is_valid_date(date, hidden) {
            profile.snap_diff_to_index.push(valid_snaps as f64);
            profile.snap_index_to_diff.push(diff);
            valid_snaps += 1;
        } else {
            profile.snap_diff_to_index.push(valid_snaps as f64 - 0.5);
        }
    }

    let snaps_per_slot = profile.snaps_per_slot as usize;
    if valid_snaps % snaps_per_slot != 0 {
        return Err(TimelineError::SlotCountNotWhole {
            snap_cnt: valid_snaps,
            snaps_per_slot: profile.snaps_per_slot,
        });
    }
    profile.snap_cnt = valid_snaps;
    profile.slot_cnt = valid_snaps / snaps_per_slot;
    if profile.slot_dates.len() != profile.slot_cnt {
        return Err(TimelineError::InconsistentSlots {
            slot_dates: profile.slot_dates.len(),
            slot_cnt: profile.slot_cnt,
        });
    }

    profile.is_week_starts = build_week_starts(&profile, env);
    profile.cell_rows = build_cell_rows(&profile, env);

    debug!(
        slot_cnt = profile.slot_cnt,
        snap_cnt = profile.snap_cnt,
        header_rows = profile.header_formats.len(),
        is_time_scale,
        "built timeline date profile"
    );
    Ok(profile)
}

impl TimelineDateProfile {
    /// `true` when `date` is on a shown day and, for time scales, inside the
    /// daily window. The window test wraps modulo 24h so windows past
    /// midnight work.
    #[must_use]
    pub fn is_valid_date(&self, date: NaiveDateTime, hidden: &dyn HiddenDayPredicate) -> bool {
        if hidden.is_hidden_day(date) {
            return false;
        }
        if !self.is_time_scale {
            return true;
        }
        let since_min = time_of_day_ms(date) - self.slot_min_time.as_rough_ms() as i64;
        since_min.rem_euclid(MS_PER_DAY) < self.time_window_ms
    }

    fn normalize_date(&self, date: NaiveDateTime, env: &DateEnv) -> NaiveDateTime {
        if self.is_time_scale {
            return date;
        }
        let day = env.start_of_day(date);
        match self.large_unit {
            Some(unit) => env.start_of(day, unit.time_unit()),
            None => day,
        }
    }

    /// Snaps an arbitrary range to the grid's units.
    ///
    /// Date scales widen the range to whole visible days first. With a large
    /// unit, an end falling mid-interval (or onto the start interval) is
    /// pushed out by one slot.
    #[must_use]
    pub fn normalize_range(
        &self,
        range: DateRange,
        env: &DateEnv,
        next_day_threshold: CalendarDuration,
    ) -> DateRange {
        if self.is_time_scale {
            return range;
        }
        let day_range = env.visible_day_range(range, next_day_threshold);
        let Some(unit) = self.large_unit else {
            return day_range;
        };

        let start = env.start_of(day_range.start, unit.time_unit());
        let mut end = env.start_of(day_range.end, unit.time_unit());
        if end != day_range.end || end <= start {
            end = env.add(end, self.slot_duration);
        }
        DateRange { start, end }
    }

    /// Continuous snap position of `date`, in `0..=snap_cnt`.
    ///
    /// Dates inside a gap round up to the next valid snap.
    #[must_use]
    pub fn snap_coverage(&self, date: NaiveDateTime, env: &DateEnv) -> f64 {
        let snap_diff =
            env.count_durations_between(self.normalized_range.start, date, self.snap_duration);
        if snap_diff < 0.0 {
            return 0.0;
        }
        if snap_diff >= self.snap_diff_to_index.len() as f64 {
            return self.snap_cnt as f64;
        }

        let whole = snap_diff.floor();
        let coverage = self.snap_diff_to_index[whole as usize];
        if coverage.fract() == 0.0 {
            coverage + (snap_diff - whole)
        } else {
            coverage.ceil()
        }
    }

    /// Unit the header should refresh on, e.g. for a "now" marker.
    #[must_use]
    pub fn timer_unit(&self) -> TimeUnit {
        self.slot_duration.greatest_denominator().0
    }

    /// Whether `date` starts a new label in the most specific header row.
    #[must_use]
    pub fn is_label_boundary(&self, date: NaiveDateTime, env: &DateEnv) -> bool {
        env.count_durations_between(self.normalized_range.start, date, self.label_interval)
            .fract()
            == 0.0
    }
}

/// Dates from `range.start` stepping by `step` while before `range.end`.
/// Stops early if a step fails to advance.
fn steps(
    env: &DateEnv,
    range: DateRange,
    step: CalendarDuration,
) -> impl Iterator<Item = NaiveDateTime> + '_ {
    std::iter::successors(Some(range.start), move |date| {
        let next = env.add(*date, step);
        (next > *date).then_some(next)
    })
    .take_while(move |date| *date < range.end)
}

fn build_week_starts(profile: &TimelineDateProfile, env: &DateEnv) -> Vec<bool> {
    let mut previous_week = None;
    profile
        .slot_dates
        .iter()
        .map(|date| {
            let week = env.week_number(*date);
            let is_week_start =
                profile.emphasize_weeks && previous_week.is_some_and(|prev| prev != week);
            previous_week = Some(week);
            is_week_start
        })
        .collect()
}

fn build_cell_rows(profile: &TimelineDateProfile, env: &DateEnv) -> Vec<Vec<HeaderCell>> {
    let formats = &profile.header_formats;
    let mut rows: Vec<Vec<HeaderCell>> = vec![Vec::new(); formats.len()];
    let last_row = formats.len().saturating_sub(1);

    for (slot, date) in profile.slot_dates.iter().copied().enumerate() {
        let is_week_start = profile.is_week_starts.get(slot).copied().unwrap_or(false);
        for (row, format) in formats.iter().enumerate() {
            let cells = &mut rows[row];
            let new_text = if row < last_row {
                let text = env.format(date, format);
                match cells.last_mut() {
                    Some(leading) if leading.text == text => {
                        leading.colspan += 1;
                        None
                    }
                    _ => Some(text),
                }
            } else {
                match cells.last_mut() {
                    Some(leading) if !profile.is_label_boundary(date, env) => {
                        leading.colspan += 1;
                        None
                    }
                    _ => Some(env.format(date, format)),
                }
            };

            if let Some(text) = new_text {
                cells.push(HeaderCell {
                    date,
                    text,
                    colspan: 1,
                    row_unit: format.largest_unit(),
                    is_week_start,
                });
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::steps;
    use crate::core::{CalendarDuration, DateEnv, DateRange};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn steps_stop_at_exclusive_end() {
        let env = DateEnv::default();
        let range = DateRange {
            start: day(1),
            end: day(4),
        };
        let dates: Vec<_> = steps(&env, range, CalendarDuration::days(1)).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn steps_terminate_on_non_advancing_duration() {
        let env = DateEnv::default();
        let range = DateRange {
            start: day(1),
            end: day(4),
        };
        assert_eq!(steps(&env, range, CalendarDuration::ZERO).count(), 1);
    }
}
