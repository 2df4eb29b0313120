//! Pointer hit testing against the slot grid.

use serde::{Deserialize, Serialize};

use crate::core::DateRange;
use crate::render::{LayoutDirection, TimelineCoords};

/// Date span selected by a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateSpan {
    pub range: DateRange,
    /// `true` on date scales, where snaps are whole days or longer.
    pub all_day: bool,
}

/// Result of resolving a horizontal position to a snap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineHit {
    pub date_span: DateSpan,
    pub slot_index: usize,
    /// Outer bounds of the hit slot.
    pub left: f64,
    pub right: f64,
}

impl TimelineCoords {
    /// Finds the snap under `position`, or `None` outside every slot.
    ///
    /// `position` is measured from the origin's left edge in both
    /// directions; right-to-left grids measure the in-slot offset from the
    /// slot's right edge.
    #[must_use]
    pub fn coordinate_to_hit(&self, position: f64) -> Option<TimelineHit> {
        let outer = self.outer();
        let slot_index = outer.left_to_index(position)?;
        let bounds = outer.bounds(slot_index)?;
        let width = bounds.width();
        if width <= 0.0 {
            return None;
        }

        let partial = match self.direction() {
            LayoutDirection::LeftToRight => (position - bounds.left) / width,
            LayoutDirection::RightToLeft => (bounds.right - position) / width,
        };
        let profile = self.profile();
        let local_snap = (partial * f64::from(profile.snaps_per_slot)).floor() as i32;

        let env = self.env();
        let slot_date = *profile.slot_dates.get(slot_index)?;
        let start = env.add(slot_date, profile.snap_duration.multiply(local_snap));
        let end = env.add(start, profile.snap_duration);

        Some(TimelineHit {
            date_span: DateSpan {
                range: DateRange { start, end },
                all_day: !profile.is_time_scale,
            },
            slot_index,
            left: bounds.left,
            right: bounds.right,
        })
    }
}
