//! Event lane layout: horizontal spans from the coordinate mapper and
//! greedy vertical stacking of overlapping segments.

mod event_order;
mod packing;

pub use event_order::{
    EventOrderField, EventOrderSpec, LaneSegment, compare_segments, parse_event_order,
};
pub use packing::{
    SegmentDims, SegmentVerticals, compute_segment_horizontals, compute_segment_verticals,
    pack_segments,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::render::{CoordinateSpan, TimelineCoords};

/// Full placement of one lane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneLayout {
    pub horizontals: IndexMap<String, CoordinateSpan>,
    pub verticals: SegmentVerticals,
}

impl LaneLayout {
    /// Top offset and horizontal span of a placed segment.
    #[must_use]
    pub fn placement(&self, key: &str) -> Option<(CoordinateSpan, f64)> {
        Some((*self.horizontals.get(key)?, *self.verticals.tops.get(key)?))
    }
}

/// Lays out a lane given each segment's measured height.
///
/// Segments without a height are positioned horizontally but not stacked.
#[must_use]
pub fn layout_lane(
    segments: &[LaneSegment],
    coords: &TimelineCoords,
    order: &[EventOrderSpec],
    heights: &IndexMap<String, f64>,
) -> LaneLayout {
    let horizontals = compute_segment_horizontals(segments, coords);
    let dims: IndexMap<String, SegmentDims> = horizontals
        .iter()
        .filter_map(|(key, span)| {
            heights
                .get(key)
                .map(|height| (key.clone(), SegmentDims::from_span(*span, *height)))
        })
        .collect();
    let verticals = compute_segment_verticals(segments, order, &dims);
    LaneLayout {
        horizontals,
        verticals,
    }
}
