mod engine;
pub mod granularity;
pub mod header_formats;
pub mod options;
pub mod slicer;
pub mod timeline_profile;

pub use engine::TimelineEngine;
pub use granularity::{
    GranularityRequest, ResolvedGranularity, STOCK_SUB_DURATIONS, resolve_granularity,
};
pub use header_formats::{HeaderFormats, compute_header_formats};
pub use options::{GranularityLimits, TimelineOptions};
pub use slicer::{TimelineSegment, TimelineSlicer};
pub use timeline_profile::{
    HeaderCell, LargeUnit, TimelineDateProfile, build_timeline_date_profile,
};
