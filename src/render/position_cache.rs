use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Measured horizontal edges of one slot cell, relative to the grid origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub left: f64,
    pub right: f64,
}

impl CellBounds {
    #[must_use]
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.right - self.left
    }
}

/// Left/right edge table for a row of measured cells plus the width of the
/// origin element they are measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionCache {
    lefts: Vec<f64>,
    rights: Vec<f64>,
    origin_width: f64,
}

impl PositionCache {
    pub fn new(
        cells: impl IntoIterator<Item = CellBounds>,
        origin_width: f64,
    ) -> TimelineResult<Self> {
        if !origin_width.is_finite() || origin_width < 0.0 {
            return Err(TimelineError::InvalidGeometry(format!(
                "origin width must be finite and >= 0, got {origin_width}"
            )));
        }

        let (lefts, rights): (Vec<f64>, Vec<f64>) = cells
            .into_iter()
            .map(|cell| (cell.left, cell.right))
            .unzip();
        for (index, (left, right)) in lefts.iter().zip(&rights).enumerate() {
            if !left.is_finite() || !right.is_finite() || right < left {
                return Err(TimelineError::InvalidGeometry(format!(
                    "cell {index} has invalid bounds [{left}, {right}]"
                )));
            }
        }

        Ok(Self {
            lefts,
            rights,
            origin_width,
        })
    }

    /// Evenly sized, touching cells starting at the origin.
    pub fn uniform(count: usize, cell_width: f64) -> TimelineResult<Self> {
        if !cell_width.is_finite() || cell_width <= 0.0 {
            return Err(TimelineError::InvalidGeometry(format!(
                "cell width must be finite and > 0, got {cell_width}"
            )));
        }
        let cells = (0..count).map(|index| {
            let left = index as f64 * cell_width;
            CellBounds::new(left, left + cell_width)
        });
        Self::new(cells, count as f64 * cell_width)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lefts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lefts.is_empty()
    }

    #[must_use]
    pub fn lefts(&self) -> &[f64] {
        &self.lefts
    }

    #[must_use]
    pub fn rights(&self) -> &[f64] {
        &self.rights
    }

    #[must_use]
    pub fn origin_width(&self) -> f64 {
        self.origin_width
    }

    #[must_use]
    pub fn bounds(&self, index: usize) -> Option<CellBounds> {
        Some(CellBounds::new(
            *self.lefts.get(index)?,
            *self.rights.get(index)?,
        ))
    }

    #[must_use]
    pub fn width(&self, index: usize) -> f64 {
        self.bounds(index).map_or(0.0, CellBounds::width)
    }

    /// First cell whose `[left, right)` contains `position`.
    #[must_use]
    pub fn left_to_index(&self, position: f64) -> Option<usize> {
        self.lefts
            .iter()
            .zip(&self.rights)
            .position(|(left, right)| position >= *left && position < *right)
    }
}
