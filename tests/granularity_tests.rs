use chrono::{NaiveDate, NaiveDateTime};
use timeline_grid::api::{GranularityLimits, GranularityRequest, resolve_granularity};
use timeline_grid::core::{CalendarDuration, DateEnv, DateRange};
use timeline_grid::error::TimelineError;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

fn range(start: NaiveDateTime, end: NaiveDateTime) -> DateRange {
    DateRange::new(start, end).expect("valid range")
}

#[test]
fn one_day_range_derives_hour_labels_and_half_hour_slots() {
    let resolved = resolve_granularity(
        range(at(2021, 3, 1), at(2021, 3, 2)),
        GranularityRequest::default(),
        GranularityLimits::default(),
        &DateEnv::default(),
    )
    .expect("resolve");

    assert_eq!(resolved.label_interval, CalendarDuration::hours(1));
    assert_eq!(resolved.slot_duration, CalendarDuration::minutes(30));
    assert_eq!(resolved.snap_duration, CalendarDuration::minutes(30));
    assert_eq!(resolved.snaps_per_slot, 1);
}

#[test]
fn too_many_day_labels_over_three_years_fall_back_to_months() {
    let resolved = resolve_granularity(
        range(at(2020, 1, 1), at(2023, 1, 1)),
        GranularityRequest {
            label_interval: Some(CalendarDuration::days(1)),
            ..GranularityRequest::default()
        },
        GranularityLimits::default(),
        &DateEnv::default(),
    )
    .expect("discarded label interval must not fail");

    assert_eq!(resolved.label_interval, CalendarDuration::months(1));
    assert_eq!(resolved.slot_duration, CalendarDuration::months(1));
}

#[test]
fn too_fine_slot_duration_is_rederived() {
    let resolved = resolve_granularity(
        range(at(2021, 1, 1), at(2022, 1, 1)),
        GranularityRequest {
            slot_duration: Some(CalendarDuration::hours(1)),
            ..GranularityRequest::default()
        },
        GranularityLimits::default(),
        &DateEnv::default(),
    )
    .expect("resolve");

    assert_eq!(resolved.label_interval, CalendarDuration::days(1));
    assert_eq!(resolved.slot_duration, CalendarDuration::days(1));
}

#[test]
fn slot_that_does_not_divide_label_is_discarded() {
    let resolved = resolve_granularity(
        range(at(2021, 3, 1), at(2021, 3, 2)),
        GranularityRequest {
            slot_duration: Some(CalendarDuration::minutes(25)),
            label_interval: Some(CalendarDuration::hours(1)),
            snap_duration: None,
        },
        GranularityLimits::default(),
        &DateEnv::default(),
    )
    .expect("resolve");

    assert_eq!(resolved.label_interval, CalendarDuration::hours(1));
    assert_eq!(resolved.slot_duration, CalendarDuration::minutes(30));
}

#[test]
fn explicit_slot_picks_coarsest_label_within_ratio_ceiling() {
    let day = range(at(2021, 3, 1), at(2021, 3, 2));
    let env = DateEnv::default();

    let quarter_hours = resolve_granularity(
        day,
        GranularityRequest {
            slot_duration: Some(CalendarDuration::minutes(15)),
            ..GranularityRequest::default()
        },
        GranularityLimits::default(),
        &env,
    )
    .expect("resolve");
    assert_eq!(quarter_hours.label_interval, CalendarDuration::hours(1));

    // 60 / 5 exceeds six slots per label, so the half hour wins.
    let five_minutes = resolve_granularity(
        day,
        GranularityRequest {
            slot_duration: Some(CalendarDuration::minutes(5)),
            ..GranularityRequest::default()
        },
        GranularityLimits::default(),
        &env,
    )
    .expect("resolve");
    assert_eq!(five_minutes.label_interval, CalendarDuration::minutes(30));
}

#[test]
fn day_label_over_hour_slots_falls_back_to_one_slot_per_label() {
    let resolved = resolve_granularity(
        range(at(2021, 3, 1), at(2021, 3, 8)),
        GranularityRequest {
            label_interval: Some(CalendarDuration::days(1)),
            ..GranularityRequest::default()
        },
        GranularityLimits::default(),
        &DateEnv::default(),
    )
    .expect("resolve");

    assert_eq!(resolved.slot_duration, CalendarDuration::days(1));
}

#[test]
fn snap_duration_sets_snaps_per_slot() {
    let resolved = resolve_granularity(
        range(at(2021, 3, 1), at(2021, 3, 2)),
        GranularityRequest {
            slot_duration: Some(CalendarDuration::hours(1)),
            snap_duration: Some(CalendarDuration::minutes(15)),
            ..GranularityRequest::default()
        },
        GranularityLimits::default(),
        &DateEnv::default(),
    )
    .expect("resolve");

    assert_eq!(resolved.snap_duration, CalendarDuration::minutes(15));
    assert_eq!(resolved.snaps_per_slot, 4);
}

#[test]
fn snap_that_does_not_divide_slot_is_rejected() {
    let result = resolve_granularity(
        range(at(2021, 3, 1), at(2021, 3, 2)),
        GranularityRequest {
            slot_duration: Some(CalendarDuration::hours(1)),
            snap_duration: Some(CalendarDuration::minutes(25)),
            ..GranularityRequest::default()
        },
        GranularityLimits::default(),
        &DateEnv::default(),
    );

    assert!(matches!(result, Err(TimelineError::SnapNotWhole { .. })));
}

#[test]
fn zero_limits_are_rejected() {
    let limits = GranularityLimits {
        max_timeline_slots: 0,
        ..GranularityLimits::default()
    };
    let result = resolve_granularity(
        range(at(2021, 3, 1), at(2021, 3, 2)),
        GranularityRequest::default(),
        limits,
        &DateEnv::default(),
    );

    assert!(matches!(result, Err(TimelineError::InvalidConfig(_))));
}

#[test]
fn tighter_min_auto_labels_prefers_coarser_interval() {
    let limits = GranularityLimits {
        min_auto_labels: 7,
        ..GranularityLimits::default()
    };
    let resolved = resolve_granularity(
        range(at(2021, 3, 1), at(2021, 3, 8)),
        GranularityRequest::default(),
        limits,
        &DateEnv::default(),
    )
    .expect("resolve");

    assert_eq!(resolved.label_interval, CalendarDuration::days(1));
}
