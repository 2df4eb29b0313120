//! Slot / label / snap granularity resolution.
//!
//! User-supplied values are validated first; anything missing or discarded
//! is derived from [`STOCK_SUB_DURATIONS`], a descending list of "nice"
//! durations. Configuration conflicts never fail: the offending value is
//! dropped with a warning. Only an explicit snap duration that does not
//! divide the slot duration is rejected.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::options::GranularityLimits;
use crate::core::{CalendarDuration, DateEnv, DateRange};
use crate::error::{TimelineError, TimelineResult};

/// Candidate slot durations and label intervals, coarsest first.
pub const STOCK_SUB_DURATIONS: [CalendarDuration; 18] = [
    CalendarDuration::years(1),
    CalendarDuration::months(1),
    CalendarDuration::days(1),
    CalendarDuration::hours(1),
    CalendarDuration::minutes(30),
    CalendarDuration::minutes(15),
    CalendarDuration::minutes(10),
    CalendarDuration::minutes(5),
    CalendarDuration::minutes(1),
    CalendarDuration::seconds(30),
    CalendarDuration::seconds(15),
    CalendarDuration::seconds(10),
    CalendarDuration::seconds(5),
    CalendarDuration::seconds(1),
    CalendarDuration::milliseconds(500),
    CalendarDuration::milliseconds(100),
    CalendarDuration::milliseconds(10),
    CalendarDuration::milliseconds(1),
];

/// Values explicitly requested by the host; `None` means "derive it".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GranularityRequest {
    pub slot_duration: Option<CalendarDuration>,
    pub label_interval: Option<CalendarDuration>,
    pub snap_duration: Option<CalendarDuration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedGranularity {
    pub slot_duration: CalendarDuration,
    pub label_interval: CalendarDuration,
    pub snap_duration: CalendarDuration,
    pub snaps_per_slot: u32,
}

/// Resolves the slot, label and snap durations for `current_range`.
pub fn resolve_granularity(
    current_range: DateRange,
    request: GranularityRequest,
    limits: GranularityLimits,
    env: &DateEnv,
) -> TimelineResult<ResolvedGranularity> {
    let limits = limits.validate()?;

    let (label_interval, slot_duration) =
        validate_label_and_slot(current_range, request, limits, env);
    let label_interval = label_interval
        .unwrap_or_else(|| auto_label_interval(current_range, slot_duration, limits, env));
    let slot_duration = slot_duration
        .unwrap_or_else(|| auto_slot_duration(current_range, label_interval, limits, env));
    let (snap_duration, snaps_per_slot) = resolve_snap(slot_duration, request.snap_duration)?;

    debug!(
        slot = %slot_duration,
        label = %label_interval,
        snap = %snap_duration,
        snaps_per_slot,
        "resolved timeline granularity"
    );

    Ok(ResolvedGranularity {
        slot_duration,
        label_interval,
        snap_duration,
        snaps_per_slot,
    })
}

/// Drops user values that would produce too many cells or that disagree
/// with each other. Returns the surviving `(label_interval, slot_duration)`.
fn validate_label_and_slot(
    current_range: DateRange,
    request: GranularityRequest,
    limits: GranularityLimits,
    env: &DateEnv,
) -> (Option<CalendarDuration>, Option<CalendarDuration>) {
    let max_slots = f64::from(limits.max_timeline_slots);
    let count = |duration: CalendarDuration| {
        env.count_durations_between(current_range.start, current_range.end, duration)
    };

    let label_interval = request.label_interval.filter(|interval| {
        if interval.is_zero() {
            warn!("slotLabelInterval must be non-zero; deriving it instead");
            return false;
        }
        if count(*interval) > max_slots {
            warn!(interval = %interval, "slotLabelInterval results in too many cells");
            return false;
        }
        true
    });

    let mut slot_duration = request.slot_duration.filter(|duration| {
        if duration.is_zero() {
            warn!("slotDuration must be non-zero; deriving it instead");
            return false;
        }
        if count(*duration) > max_slots {
            warn!(duration = %duration, "slotDuration results in too many cells");
            return false;
        }
        true
    });

    if let (Some(label), Some(slot)) = (label_interval, slot_duration) {
        match label.whole_divide(slot) {
            Some(slots_per_label) if slots_per_label >= 1 => {}
            _ => {
                warn!(
                    label = %label,
                    slot = %slot,
                    "slotLabelInterval must be a multiple of slotDuration"
                );
                slot_duration = None;
            }
        }
    }

    (label_interval, slot_duration)
}

/// Coarsest stock interval that groups an acceptable number of slots, or
/// (without a slot duration) that yields at least `min_auto_labels` labels.
fn auto_label_interval(
    current_range: DateRange,
    slot_duration: Option<CalendarDuration>,
    limits: GranularityLimits,
    env: &DateEnv,
) -> CalendarDuration {
    let max_per_label = i64::from(limits.max_auto_slots_per_label);

    match slot_duration {
        Some(slot) => STOCK_SUB_DURATIONS
            .iter()
            .copied()
            .find(|candidate| {
                candidate
                    .whole_divide(slot)
                    .is_some_and(|per_label| (1..=max_per_label).contains(&per_label))
            })
            .unwrap_or(slot),
        None => {
            let min_labels = f64::from(limits.min_auto_labels);
            STOCK_SUB_DURATIONS
                .iter()
                .copied()
                .find(|candidate| {
                    env.count_durations_between(current_range.start, current_range.end, *candidate)
                        >= min_labels
                })
                .unwrap_or(STOCK_SUB_DURATIONS[STOCK_SUB_DURATIONS.len() - 1])
        }
    }
}

/// Coarsest stock duration that splits `label_interval` into 2..=max slots,
/// provided the whole range stays under `max_auto_cells`; otherwise one slot
/// per label.
fn auto_slot_duration(
    current_range: DateRange,
    label_interval: CalendarDuration,
    limits: GranularityLimits,
    env: &DateEnv,
) -> CalendarDuration {
    let max_per_label = i64::from(limits.max_auto_slots_per_label);

    STOCK_SUB_DURATIONS
        .iter()
        .copied()
        .find(|candidate| {
            label_interval
                .whole_divide(*candidate)
                .is_some_and(|per_label| per_label > 1 && per_label <= max_per_label)
        })
        .filter(|candidate| {
            env.count_durations_between(current_range.start, current_range.end, *candidate)
                <= f64::from(limits.max_auto_cells)
        })
        .unwrap_or(label_interval)
}

fn resolve_snap(
    slot_duration: CalendarDuration,
    snap_duration: Option<CalendarDuration>,
) -> TimelineResult<(CalendarDuration, u32)> {
    let Some(snap) = snap_duration else {
        return Ok((slot_duration, 1));
    };
    if snap.is_zero() {
        return Err(TimelineError::InvalidDuration(
            "snapDuration must be non-zero".to_owned(),
        ));
    }

    slot_duration
        .whole_divide(snap)
        .filter(|per_slot| *per_slot >= 1)
        .and_then(|per_slot| u32::try_from(per_slot).ok())
        .map(|per_slot| (snap, per_slot))
        .ok_or_else(|| TimelineError::SnapNotWhole {
            slot: slot_duration.to_string(),
            snap: snap.to_string(),
        })
}
