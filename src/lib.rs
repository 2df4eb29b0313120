//! timeline-grid: slot grids, pixel coordinates and event packing for
//! horizontal timeline calendars.
//!
//! The crate is split the way data flows through a render pass:
//! `api` resolves granularity and builds the immutable date profile,
//! `render` maps dates onto measured slot geometry, `interaction` inverts
//! that mapping for pointer hits and `layout` stacks event segments.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod telemetry;

pub use api::{TimelineDateProfile, TimelineEngine, TimelineOptions};
pub use error::{TimelineError, TimelineResult};
