use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::TimelineDateProfile;
use crate::core::{CalendarDuration, DateEnv, DateProfile, DateRange};
use crate::error::{TimelineError, TimelineResult};
use crate::render::LayoutDirection;
use crate::render::position_cache::PositionCache;

/// Horizontal extent of a date range in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSpan {
    pub left: f64,
    pub right: f64,
}

impl CoordinateSpan {
    #[must_use]
    pub fn width(self) -> f64 {
        self.right - self.left
    }
}

/// Maps dates onto measured slot geometry.
///
/// `outer` holds full cell bounds and `inner` the content boxes inside the
/// cell borders. Both must carry one entry per slot of the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineCoords {
    profile: Arc<TimelineDateProfile>,
    date_profile: DateProfile,
    env: DateEnv,
    outer: PositionCache,
    inner: PositionCache,
    direction: LayoutDirection,
}

impl TimelineCoords {
    pub fn new(
        profile: Arc<TimelineDateProfile>,
        date_profile: DateProfile,
        env: DateEnv,
        outer: PositionCache,
        inner: PositionCache,
        direction: LayoutDirection,
    ) -> TimelineResult<Self> {
        for cache in [&outer, &inner] {
            if cache.len() != profile.slot_cnt {
                return Err(TimelineError::GeometryMismatch {
                    expected: profile.slot_cnt,
                    actual: cache.len(),
                });
            }
        }

        Ok(Self {
            profile,
            date_profile,
            env,
            outer,
            inner,
            direction,
        })
    }

    #[must_use]
    pub fn profile(&self) -> &TimelineDateProfile {
        &self.profile
    }

    #[must_use]
    pub fn date_profile(&self) -> &DateProfile {
        &self.date_profile
    }

    #[must_use]
    pub fn env(&self) -> &DateEnv {
        &self.env
    }

    #[must_use]
    pub fn outer(&self) -> &PositionCache {
        &self.outer
    }

    #[must_use]
    pub fn inner(&self) -> &PositionCache {
        &self.inner
    }

    #[must_use]
    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    #[must_use]
    pub fn snap_coverage(&self, date: NaiveDateTime) -> f64 {
        self.profile.snap_coverage(date, &self.env)
    }

    /// Coordinate of `date`: `0..width` left-to-right, `-width..0`
    /// right-to-left.
    #[must_use]
    pub fn date_to_coordinate(&self, date: NaiveDateTime) -> f64 {
        let profile = &*self.profile;
        if profile.slot_cnt == 0 {
            return 0.0;
        }

        let slot_coverage = self.snap_coverage(date) / f64::from(profile.snaps_per_slot);
        let slot_index = (slot_coverage.floor() as usize).min(profile.slot_cnt - 1);
        let partial = slot_coverage - slot_index as f64;
        let inner_width = self.inner.width(slot_index);

        match self.direction {
            LayoutDirection::LeftToRight => self.outer.lefts()[slot_index] + inner_width * partial,
            LayoutDirection::RightToLeft => {
                self.outer.rights()[slot_index] - inner_width * partial - self.outer.origin_width()
            }
        }
    }

    /// Edges of `range`. In right-to-left grids the start maps to `right`.
    #[must_use]
    pub fn range_to_coordinates(&self, range: DateRange) -> CoordinateSpan {
        let start = self.date_to_coordinate(range.start);
        let end = self.date_to_coordinate(range.end);
        match self.direction {
            LayoutDirection::LeftToRight => CoordinateSpan {
                left: start,
                right: end,
            },
            LayoutDirection::RightToLeft => CoordinateSpan {
                left: end,
                right: start,
            },
        }
    }

    /// Membership in the unnormalized current range, e.g. for a now marker.
    #[must_use]
    pub fn is_date_within_visible_range(&self, date: NaiveDateTime) -> bool {
        self.date_profile.current_range.contains(date)
    }

    /// Scroll offset for a time of day, measured from the first active day.
    ///
    /// Non-zero left-to-right offsets move one pixel past the slot border.
    #[must_use]
    pub fn duration_to_coordinate(&self, duration: CalendarDuration) -> f64 {
        let first_day = self.env.start_of_day(self.date_profile.active_range.start);
        let coordinate = self.date_to_coordinate(self.env.add(first_day, duration));
        if !self.direction.is_rtl() && coordinate != 0.0 {
            coordinate + 1.0
        } else {
            coordinate
        }
    }
}
