use approx::assert_abs_diff_eq;
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use indexmap::IndexMap;
use timeline_grid::api::TimelineSegment;
use timeline_grid::core::{CalendarDuration, DateProfile, DateRange, HiddenDays};
use timeline_grid::layout::LaneSegment;
use timeline_grid::render::{LayoutDirection, PositionCache};
use timeline_grid::{TimelineEngine, TimelineError, TimelineOptions};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|day| day.and_hms_opt(h, min, 0))
        .expect("valid date")
}

fn range(start: NaiveDateTime, end: NaiveDateTime) -> DateRange {
    DateRange::new(start, end).expect("valid range")
}

fn one_day() -> DateProfile {
    DateProfile::new(range(at(2021, 3, 1, 0, 0), at(2021, 3, 2, 0, 0)))
}

fn measured_engine(options: TimelineOptions) -> TimelineEngine {
    let mut engine = TimelineEngine::new(options).expect("engine");
    let slot_cnt = engine
        .set_date_profile(one_day())
        .expect("build profile")
        .slot_cnt;
    let cache = PositionCache::uniform(slot_cnt, 40.0).expect("cache");
    engine
        .set_slot_geometry(cache.clone(), cache)
        .expect("geometry");
    engine
}

#[test]
fn queries_before_inputs_report_missing_state() {
    let mut engine = TimelineEngine::new(TimelineOptions::default()).expect("engine");

    assert!(matches!(engine.profile(), Err(TimelineError::MissingProfile)));
    assert!(matches!(engine.coords(), Err(TimelineError::MissingGeometry)));
    assert!(matches!(engine.slat_columns(50.0), Err(TimelineError::MissingProfile)));

    let cache = PositionCache::uniform(4, 10.0).expect("cache");
    let err = engine
        .set_slot_geometry(cache.clone(), cache)
        .expect_err("geometry without profile");
    assert!(matches!(err, TimelineError::MissingProfile));
}

#[test]
fn invalid_options_are_rejected_up_front() {
    let options = TimelineOptions {
        slot_min_width: Some(f64::NAN),
        ..TimelineOptions::default()
    };
    assert!(matches!(
        TimelineEngine::new(options),
        Err(TimelineError::InvalidConfig(_))
    ));
}

#[test]
fn geometry_must_match_slot_count() {
    let mut engine = TimelineEngine::new(TimelineOptions::default()).expect("engine");
    let profile = engine.set_date_profile(one_day()).expect("build profile");
    assert_eq!(profile.slot_cnt, 48);

    let cache = PositionCache::uniform(10, 40.0).expect("cache");
    let err = engine
        .set_slot_geometry(cache.clone(), cache)
        .expect_err("mismatched geometry");
    assert!(matches!(
        err,
        TimelineError::GeometryMismatch {
            expected: 48,
            actual: 10
        }
    ));
}

#[test]
fn measured_engine_maps_dates_and_positions() {
    let engine = measured_engine(TimelineOptions::default());

    let left = engine
        .date_to_coordinate(at(2021, 3, 1, 1, 0))
        .expect("coordinate");
    assert_abs_diff_eq!(left, 80.0);

    let width = engine
        .duration_to_coordinate(CalendarDuration::hours(1))
        .expect("duration");
    assert_abs_diff_eq!(width, 81.0);

    let span = engine
        .range_to_coordinates(range(at(2021, 3, 1, 1, 0), at(2021, 3, 1, 2, 15)))
        .expect("span");
    assert_abs_diff_eq!(span.left, 80.0);
    assert_abs_diff_eq!(span.right, 180.0);

    let hit = engine
        .coordinate_to_hit(85.0)
        .expect("coords")
        .expect("inside grid");
    assert_eq!(hit.slot_index, 2);
    assert_eq!(hit.date_span.range.start, at(2021, 3, 1, 1, 0));
    assert_eq!(hit.date_span.range.end, at(2021, 3, 1, 1, 30));
    assert!(!hit.date_span.all_day);

    assert!(engine.coordinate_to_hit(-5.0).expect("coords").is_none());
}

#[test]
fn engine_slices_through_its_profile() {
    let engine = measured_engine(TimelineOptions::default());
    let segment = engine
        .slice(range(at(2021, 2, 28, 20, 0), at(2021, 3, 1, 3, 0)))
        .expect("profile")
        .expect("visible");
    assert_eq!(segment.start, at(2021, 3, 1, 0, 0));
    assert!(!segment.is_start);
    assert!(segment.is_end);
}

#[test]
fn identical_date_profile_keeps_geometry() {
    let mut engine = measured_engine(TimelineOptions::default());

    engine.set_date_profile(one_day()).expect("same profile");
    assert!(engine.coords().is_ok());

    let next_day = DateProfile::new(range(at(2021, 3, 2, 0, 0), at(2021, 3, 3, 0, 0)));
    engine.set_date_profile(next_day).expect("new profile");
    assert!(matches!(engine.coords(), Err(TimelineError::MissingGeometry)));
}

#[test]
fn changed_options_rebuild_the_profile() {
    let mut engine = measured_engine(TimelineOptions::default());

    engine
        .set_options(TimelineOptions::default())
        .expect("unchanged options");
    assert!(engine.coords().is_ok());

    engine
        .set_options(TimelineOptions::default().with_slot_duration(CalendarDuration::hours(1)))
        .expect("hourly options");
    assert!(engine.coords().is_err());
    assert_eq!(engine.profile().expect("profile").slot_cnt, 24);

    engine
        .set_options(TimelineOptions {
            first_day: Weekday::Sun,
            ..engine.options().clone()
        })
        .expect("sunday options");
    assert_eq!(engine.env().first_day, Weekday::Sun);
}

#[test]
fn direction_change_flows_into_new_coordinates() {
    let mut engine = measured_engine(TimelineOptions::default());
    engine
        .set_options(TimelineOptions::default().with_direction(LayoutDirection::RightToLeft))
        .expect("rtl options");

    let cache = PositionCache::uniform(48, 40.0).expect("cache");
    engine
        .set_slot_geometry(cache.clone(), cache)
        .expect("geometry");
    assert_eq!(
        engine.coords().expect("coords").direction(),
        LayoutDirection::RightToLeft
    );
}

#[test]
fn hidden_days_shrink_the_grid() {
    let week = DateProfile::new(range(at(2021, 3, 1, 0, 0), at(2021, 3, 8, 0, 0)));
    let options = TimelineOptions::default().with_slot_duration(CalendarDuration::days(1));
    let mut engine = TimelineEngine::new(options).expect("engine");
    assert_eq!(engine.set_date_profile(week).expect("profile").slot_cnt, 7);

    engine
        .set_hidden_days(HiddenDays::from_weekdays([Weekday::Sat, Weekday::Sun]).expect("mask"))
        .expect("hidden days");
    assert_eq!(engine.profile().expect("profile").slot_cnt, 5);
}

#[test]
fn slat_columns_fall_back_to_label_width() {
    let engine = measured_engine(TimelineOptions::default());
    assert_eq!(engine.profile().expect("profile").slots_per_label, Some(2));

    let wide = engine.slat_columns(100.0).expect("columns");
    assert_eq!(wide.len(), 1);
    assert_eq!(wide[0].span, 48);
    assert_abs_diff_eq!(wide[0].min_width, 50.0);

    let narrow = engine.slat_columns(20.0).expect("columns");
    assert_abs_diff_eq!(narrow[0].min_width, 30.0);

    let explicit = measured_engine(TimelineOptions {
        slot_min_width: Some(12.0),
        ..TimelineOptions::default()
    });
    let columns = explicit.slat_columns(100.0).expect("columns");
    assert_abs_diff_eq!(columns[0].min_width, 12.0);
}

#[test]
fn lane_layout_is_reused_until_geometry_changes() {
    let mut engine = measured_engine(TimelineOptions::default());
    let event = range(at(2021, 3, 1, 1, 0), at(2021, 3, 1, 2, 0));
    let segment: TimelineSegment = engine
        .slice(event)
        .expect("profile")
        .expect("visible");
    let segments = vec![
        LaneSegment::new("a", segment, event),
        LaneSegment::new("b", segment, event),
    ];
    let heights: IndexMap<String, f64> = [("a".to_owned(), 10.0), ("b".to_owned(), 10.0)]
        .into_iter()
        .collect();

    let first = engine
        .layout_segments(&segments, &heights)
        .expect("layout")
        .clone();
    assert_abs_diff_eq!(first.verticals.height, 20.0);
    let (span, _) = first.placement("a").expect("placed");
    assert_abs_diff_eq!(span.left, 80.0);
    assert_abs_diff_eq!(span.right, 160.0);

    let again = engine.layout_segments(&segments, &heights).expect("layout");
    assert_eq!(*again, first);

    let wider = PositionCache::uniform(48, 50.0).expect("cache");
    engine
        .set_slot_geometry(wider.clone(), wider)
        .expect("geometry");
    let rescaled = engine.layout_segments(&segments, &heights).expect("layout");
    let (span, _) = rescaled.placement("a").expect("placed");
    assert_abs_diff_eq!(span.left, 100.0);
    assert_abs_diff_eq!(span.right, 200.0);
}
