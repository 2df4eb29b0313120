use std::sync::{Arc, LazyLock};

use chrono::Timelike;
use smallvec::SmallVec;

use crate::core::{
    CalendarDuration, CustomFormatFn, DateEnv, DateFormatFields, DateRange, FormatContext,
    MeridiemStyle, MonthStyle, NumericStyle, SlotLabelFormat, TextStyle, TimeUnit,
};

pub type HeaderFormats = SmallVec<[SlotLabelFormat; 3]>;

// Shared so repeated builds compare equal.
static MINUTE_SUFFIX: LazyLock<CustomFormatFn> = LazyLock::new(|| {
    Arc::new(|context: &FormatContext| format!(":{:02}", context.date.minute()))
});
static SECOND_SUFFIX: LazyLock<CustomFormatFn> = LazyLock::new(|| {
    Arc::new(|context: &FormatContext| format!(":{:02}", context.date.second()))
});
static MILLISECOND_SUFFIX: LazyLock<CustomFormatFn> = LazyLock::new(|| {
    Arc::new(|context: &FormatContext| format!(".{:03}", context.millisecond()))
});

/// Whole `unit`s spanned by `range`, or `0` when the span is not a clean
/// multiple. Weeks count whole days divided by seven.
pub(crate) fn current_range_as(range: DateRange, unit: TimeUnit, env: &DateEnv) -> i64 {
    let whole = match unit {
        TimeUnit::Year => env.diff_whole_years(range.start, range.end),
        TimeUnit::Month => env.diff_whole_months(range.start, range.end),
        TimeUnit::Week => env
            .diff_whole_days(range.start, range.end)
            .map(|days| days / 7),
        TimeUnit::Day => env.diff_whole_days(range.start, range.end),
        _ => None,
    };
    whole.unwrap_or(0)
}

/// Derives one to three header rows from the label interval's unit.
///
/// Broader context (year, month, day) is hoisted into an outer row only
/// when the visible range spans more than one unit of that context.
#[must_use]
pub fn compute_header_formats(
    label_interval: CalendarDuration,
    current_range: DateRange,
    env: &DateEnv,
    week_numbers: bool,
    max_auto_slots_per_label: u32,
) -> HeaderFormats {
    let (mut unit, _) = label_interval.greatest_denominator();
    if unit == TimeUnit::Week && !week_numbers {
        unit = TimeUnit::Day;
    }

    let spans_years = current_range_as(current_range, TimeUnit::Year, env) > 1;
    let dense = |rough_units: f64| rough_units / 60.0 >= f64::from(max_auto_slots_per_label);

    let mut rows = HeaderFormats::new();
    match unit {
        TimeUnit::Year => rows.push(year_numeric().into()),
        TimeUnit::Month => {
            if spans_years {
                rows.push(year_numeric().into());
            }
            rows.push(
                DateFormatFields {
                    month: Some(MonthStyle::Short),
                    ..DateFormatFields::default()
                }
                .into(),
            );
        }
        TimeUnit::Week => {
            if spans_years {
                rows.push(year_numeric().into());
            }
            rows.push(week_label(TextStyle::Narrow).into());
        }
        TimeUnit::Day => {
            if spans_years {
                rows.push(
                    DateFormatFields {
                        year: Some(NumericStyle::Numeric),
                        month: Some(MonthStyle::Long),
                        ..DateFormatFields::default()
                    }
                    .into(),
                );
            } else if current_range_as(current_range, TimeUnit::Month, env) > 1 {
                rows.push(
                    DateFormatFields {
                        month: Some(MonthStyle::Long),
                        ..DateFormatFields::default()
                    }
                    .into(),
                );
            }
            if week_numbers {
                rows.push(week_label(TextStyle::Short).into());
            }
            rows.push(
                DateFormatFields {
                    weekday: Some(TextStyle::Narrow),
                    day: Some(NumericStyle::Numeric),
                    ..DateFormatFields::default()
                }
                .into(),
            );
        }
        TimeUnit::Hour => {
            if week_numbers {
                rows.push(week_label(TextStyle::Short).into());
            }
            if current_range_as(current_range, TimeUnit::Day, env) > 1 {
                rows.push(
                    DateFormatFields {
                        weekday: Some(TextStyle::Short),
                        day: Some(NumericStyle::Numeric),
                        month: Some(MonthStyle::Numeric),
                        omit_commas: true,
                        ..DateFormatFields::default()
                    }
                    .into(),
                );
            }
            rows.push(
                DateFormatFields {
                    hour: Some(NumericStyle::Numeric),
                    minute: Some(NumericStyle::TwoDigit),
                    omit_zero_minute: true,
                    meridiem: Some(MeridiemStyle::Short),
                    ..DateFormatFields::default()
                }
                .into(),
            );
        }
        TimeUnit::Minute => {
            if dense(label_interval.as_rough_minutes()) {
                rows.push(
                    DateFormatFields {
                        hour: Some(NumericStyle::Numeric),
                        meridiem: Some(MeridiemStyle::Short),
                        ..DateFormatFields::default()
                    }
                    .into(),
                );
                rows.push(SlotLabelFormat::Custom(Arc::clone(&MINUTE_SUFFIX)));
            } else {
                rows.push(
                    DateFormatFields {
                        hour: Some(NumericStyle::Numeric),
                        minute: Some(NumericStyle::Numeric),
                        meridiem: Some(MeridiemStyle::Short),
                        ..DateFormatFields::default()
                    }
                    .into(),
                );
            }
        }
        TimeUnit::Second => {
            if dense(label_interval.as_rough_seconds()) {
                rows.push(
                    DateFormatFields {
                        hour: Some(NumericStyle::Numeric),
                        minute: Some(NumericStyle::TwoDigit),
                        meridiem: Some(MeridiemStyle::Lowercase),
                        ..DateFormatFields::default()
                    }
                    .into(),
                );
                rows.push(SlotLabelFormat::Custom(Arc::clone(&SECOND_SUFFIX)));
            } else {
                rows.push(clock_with_seconds().into());
            }
        }
        TimeUnit::Millisecond => {
            rows.push(clock_with_seconds().into());
            rows.push(SlotLabelFormat::Custom(Arc::clone(&MILLISECOND_SUFFIX)));
        }
    }
    rows
}

fn year_numeric() -> DateFormatFields {
    DateFormatFields {
        year: Some(NumericStyle::Numeric),
        ..DateFormatFields::default()
    }
}

fn week_label(style: TextStyle) -> DateFormatFields {
    DateFormatFields {
        week: Some(style),
        ..DateFormatFields::default()
    }
}

fn clock_with_seconds() -> DateFormatFields {
    DateFormatFields {
        hour: Some(NumericStyle::Numeric),
        minute: Some(NumericStyle::TwoDigit),
        second: Some(NumericStyle::TwoDigit),
        meridiem: Some(MeridiemStyle::Lowercase),
        ..DateFormatFields::default()
    }
}
