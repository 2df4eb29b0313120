use indexmap::IndexMap;
#[cfg(feature = "parallel-layout")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::layout::event_order::{EventOrderSpec, LaneSegment, compare_segments};
use crate::render::{CoordinateSpan, TimelineCoords};

/// Measured rectangle of a segment: horizontal edges plus rendered height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentDims {
    pub left: f64,
    pub right: f64,
    pub height: f64,
}

impl SegmentDims {
    #[must_use]
    pub fn new(left: f64, right: f64, height: f64) -> Self {
        Self {
            left,
            right,
            height,
        }
    }

    #[must_use]
    pub fn from_span(span: CoordinateSpan, height: f64) -> Self {
        Self::new(span.left, span.right, height)
    }

    fn collides(self, top: f64, other: Self, other_top: f64) -> bool {
        self.right > other.left
            && self.left < other.right
            && top + self.height > other_top
            && top < other_top + other.height
    }
}

/// Packed top offsets, ordered by offset, and the lane's content height.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentVerticals {
    pub tops: IndexMap<String, f64>,
    pub height: f64,
}

#[derive(Debug, Clone, Copy)]
struct Placement<'a> {
    key: &'a str,
    dims: SegmentDims,
    top: f64,
}

/// Horizontal span of every segment, keyed by segment key.
#[must_use]
pub fn compute_segment_horizontals(
    segments: &[LaneSegment],
    coords: &TimelineCoords,
) -> IndexMap<String, CoordinateSpan> {
    #[cfg(feature = "parallel-layout")]
    {
        let spans: Vec<(String, CoordinateSpan)> = segments
            .par_iter()
            .map(|seg| (seg.key.clone(), coords.range_to_coordinates(seg.segment.range())))
            .collect();
        spans.into_iter().collect()
    }

    #[cfg(not(feature = "parallel-layout"))]
    {
        segments
            .iter()
            .map(|seg| (seg.key.clone(), coords.range_to_coordinates(seg.segment.range())))
            .collect()
    }
}

/// Sorts `segments` by `order` and stacks them greedily.
///
/// Segments without an entry in `dims` are skipped.
#[must_use]
pub fn compute_segment_verticals(
    segments: &[LaneSegment],
    order: &[EventOrderSpec],
    dims: &IndexMap<String, SegmentDims>,
) -> SegmentVerticals {
    let mut sorted: Vec<&LaneSegment> = segments.iter().collect();
    sorted.sort_by(|a, b| compare_segments(a, b, order));

    let verticals = pack_segments(
        sorted
            .into_iter()
            .filter_map(|seg| dims.get(&seg.key).map(|dims| (seg.key.as_str(), *dims))),
    );
    trace!(
        segments = segments.len(),
        placed = verticals.tops.len(),
        height = verticals.height,
        "packed lane segments"
    );
    verticals
}

/// Places each rectangle, in the given order, at the first top offset free
/// of every earlier placement.
///
/// Placements stay sorted by top. Each candidate is pushed below every
/// placement it collides with during one pass; the insert position then
/// advances past placements whose top is not below the final offset.
#[must_use]
pub fn pack_segments<'a>(
    items: impl IntoIterator<Item = (&'a str, SegmentDims)>,
) -> SegmentVerticals {
    let mut placements: Vec<Placement<'a>> = Vec::new();
    let mut max_bottom = 0.0_f64;

    for (key, dims) in items {
        let mut top = 0.0;
        let mut insert_at = 0;
        for (index, placement) in placements.iter().enumerate() {
            if dims.collides(top, placement.dims, placement.top) {
                top = placement.top + placement.dims.height;
                insert_at = index;
            }
        }
        while insert_at < placements.len() && top >= placements[insert_at].top {
            insert_at += 1;
        }

        placements.insert(insert_at, Placement { key, dims, top });
        max_bottom = max_bottom.max(top + dims.height);
    }

    SegmentVerticals {
        tops: placements
            .iter()
            .map(|placement| (placement.key.to_owned(), placement.top))
            .collect(),
        height: max_bottom,
    }
}
