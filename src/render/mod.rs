//! Pixel-space side of the timeline: measured slot geometry and the
//! date-to-coordinate mapper built on it.

mod coords;
mod position_cache;
mod slats;

pub use coords::{CoordinateSpan, TimelineCoords};
pub use position_cache::{CellBounds, PositionCache};
pub use slats::{SlatColumn, fallback_slot_min_width, slat_columns};

use serde::{Deserialize, Serialize};

/// Horizontal flow of the grid.
///
/// Right-to-left coordinates are measured from the origin's right edge and
/// run from the negative width up to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl LayoutDirection {
    #[must_use]
    pub fn is_rtl(self) -> bool {
        self == Self::RightToLeft
    }
}
