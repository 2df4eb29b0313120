use std::sync::Arc;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use tracing::trace;

use crate::api::options::TimelineOptions;
use crate::api::slicer::{TimelineSegment, TimelineSlicer};
use crate::api::timeline_profile::{TimelineDateProfile, build_timeline_date_profile};
use crate::core::{
    CalendarDuration, DateEnv, DateProfile, DateRange, HiddenDayPredicate, HiddenDays,
};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::TimelineHit;
use crate::layout::{LaneLayout, LaneSegment, layout_lane};
use crate::render::{
    CoordinateSpan, PositionCache, SlatColumn, TimelineCoords, fallback_slot_min_width,
    slat_columns,
};

type SharedHiddenDays = Arc<dyn HiddenDayPredicate + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
struct SlotGeometry {
    outer: PositionCache,
    inner: PositionCache,
}

#[derive(Debug, Clone, PartialEq)]
struct LayoutCacheEntry {
    segments: Vec<LaneSegment>,
    heights: IndexMap<String, f64>,
    layout: LaneLayout,
}

/// Owns the current timeline snapshots and rebuilds them when inputs change.
///
/// Rebuild order follows the data flow: a new date profile or new options
/// produce a new [`TimelineDateProfile`] and drop the measured geometry; new
/// geometry produces new [`TimelineCoords`]; lane layouts are cached against
/// the coordinates they were computed with.
pub struct TimelineEngine {
    options: TimelineOptions,
    env: DateEnv,
    hidden: SharedHiddenDays,
    date_profile: Option<DateProfile>,
    profile: Option<Arc<TimelineDateProfile>>,
    geometry: Option<SlotGeometry>,
    coords: Option<TimelineCoords>,
    layout_cache: Option<LayoutCacheEntry>,
}

impl TimelineEngine {
    pub fn new(options: TimelineOptions) -> TimelineResult<Self> {
        let options = options.validate()?;
        Ok(Self {
            env: DateEnv::new(options.first_day),
            options,
            hidden: Arc::new(HiddenDays::none()),
            date_profile: None,
            profile: None,
            geometry: None,
            coords: None,
            layout_cache: None,
        })
    }

    /// Replaces the hidden-day rule. Rebuilds the profile if one exists.
    pub fn set_hidden_days<H>(&mut self, hidden: H) -> TimelineResult<()>
    where
        H: HiddenDayPredicate + Send + Sync + 'static,
    {
        self.hidden = Arc::new(hidden);
        self.rebuild_profile()
    }

    #[must_use]
    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }

    #[must_use]
    pub fn env(&self) -> &DateEnv {
        &self.env
    }

    pub fn set_options(&mut self, options: TimelineOptions) -> TimelineResult<()> {
        if options == self.options {
            trace!("timeline options unchanged");
            return Ok(());
        }
        let options = options.validate()?;
        self.env.first_day = options.first_day;
        self.options = options;
        self.rebuild_profile()
    }

    /// Installs a new date profile and rebuilds the slot grid when it differs
    /// from the current one.
    pub fn set_date_profile(
        &mut self,
        date_profile: DateProfile,
    ) -> TimelineResult<&TimelineDateProfile> {
        if self.date_profile == Some(date_profile) && self.profile.is_some() {
            trace!("timeline date profile cache hit");
        } else {
            self.date_profile = Some(date_profile);
            self.rebuild_profile()?;
        }
        self.profile()
    }

    pub fn profile(&self) -> TimelineResult<&TimelineDateProfile> {
        self.profile.as_deref().ok_or(TimelineError::MissingProfile)
    }

    /// Supplies measured slot cells. `outer` are the full cells and `inner`
    /// their content boxes.
    pub fn set_slot_geometry(
        &mut self,
        outer: PositionCache,
        inner: PositionCache,
    ) -> TimelineResult<()> {
        let geometry = SlotGeometry { outer, inner };
        if self.geometry.as_ref() == Some(&geometry) && self.coords.is_some() {
            trace!("slot geometry cache hit");
            return Ok(());
        }

        let (Some(profile), Some(date_profile)) = (&self.profile, self.date_profile) else {
            return Err(TimelineError::MissingProfile);
        };
        let coords = TimelineCoords::new(
            Arc::clone(profile),
            date_profile,
            self.env.clone(),
            geometry.outer.clone(),
            geometry.inner.clone(),
            self.options.direction,
        )?;
        trace!(slots = coords.outer().len(), "rebuilt timeline coordinates");
        self.geometry = Some(geometry);
        self.coords = Some(coords);
        self.layout_cache = None;
        Ok(())
    }

    /// Coordinate mapper for the current geometry.
    pub fn coords(&self) -> TimelineResult<&TimelineCoords> {
        self.coords.as_ref().ok_or(TimelineError::MissingGeometry)
    }

    pub fn slicer(&self) -> TimelineResult<TimelineSlicer<'_>> {
        let profile = self.profile()?;
        Ok(TimelineSlicer::new(profile, &self.env, &*self.hidden)
            .with_next_day_threshold(self.options.next_day_threshold))
    }

    pub fn slice(&self, range: DateRange) -> TimelineResult<Option<TimelineSegment>> {
        Ok(self.slicer()?.slice(range))
    }

    pub fn date_to_coordinate(&self, date: NaiveDateTime) -> TimelineResult<f64> {
        Ok(self.coords()?.date_to_coordinate(date))
    }

    pub fn range_to_coordinates(&self, range: DateRange) -> TimelineResult<CoordinateSpan> {
        Ok(self.coords()?.range_to_coordinates(range))
    }

    pub fn duration_to_coordinate(&self, duration: CalendarDuration) -> TimelineResult<f64> {
        Ok(self.coords()?.duration_to_coordinate(duration))
    }

    pub fn coordinate_to_hit(&self, position: f64) -> TimelineResult<Option<TimelineHit>> {
        Ok(self.coords()?.coordinate_to_hit(position))
    }

    /// Column layout for the slat body. Without a configured minimum the
    /// slot width derives from the widest measured header label.
    pub fn slat_columns(&self, max_cushion_width: f64) -> TimelineResult<Vec<SlatColumn>> {
        let profile = self.profile()?;
        let min_width = self
            .options
            .slot_min_width
            .unwrap_or_else(|| fallback_slot_min_width(max_cushion_width, profile.slots_per_label));
        Ok(slat_columns(profile, Some(min_width)))
    }

    /// Positions and stacks a lane's segments, reusing the previous result
    /// when neither the inputs nor the coordinates changed.
    pub fn layout_segments(
        &mut self,
        segments: &[LaneSegment],
        heights: &IndexMap<String, f64>,
    ) -> TimelineResult<&LaneLayout> {
        let coords = self.coords.as_ref().ok_or(TimelineError::MissingGeometry)?;

        let cached = self
            .layout_cache
            .as_ref()
            .is_some_and(|entry| entry.segments == segments && entry.heights == *heights);
        if cached {
            trace!(segments = segments.len(), "lane layout cache hit");
        } else {
            let layout = layout_lane(segments, coords, &self.options.event_order, heights);
            self.layout_cache = Some(LayoutCacheEntry {
                segments: segments.to_vec(),
                heights: heights.clone(),
                layout,
            });
        }

        self.layout_cache
            .as_ref()
            .map(|entry| &entry.layout)
            .ok_or(TimelineError::MissingGeometry)
    }

    fn rebuild_profile(&mut self) -> TimelineResult<()> {
        self.geometry = None;
        self.coords = None;
        self.layout_cache = None;
        let Some(date_profile) = self.date_profile else {
            self.profile = None;
            return Ok(());
        };

        match build_timeline_date_profile(&date_profile, &self.options, &self.env, &*self.hidden) {
            Ok(profile) => {
                self.profile = Some(Arc::new(profile));
                Ok(())
            }
            Err(err) => {
                self.profile = None;
                Err(err)
            }
        }
    }
}
