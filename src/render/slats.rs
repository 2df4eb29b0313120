use serde::{Deserialize, Serialize};

use crate::api::TimelineDateProfile;

const MIN_FALLBACK_SLOT_WIDTH: f64 = 30.0;

/// Column group describing the slat body: `span` columns of at least
/// `min_width` pixels each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlatColumn {
    pub span: usize,
    pub min_width: f64,
}

#[must_use]
pub fn slat_columns(
    profile: &TimelineDateProfile,
    slot_min_width: Option<f64>,
) -> Vec<SlatColumn> {
    let min_width = slot_min_width.filter(|width| *width > 0.0).unwrap_or(1.0);
    vec![SlatColumn {
        span: profile.slot_cnt,
        min_width,
    }]
}

/// Slot width derived from the widest measured header label when the host
/// sets no explicit minimum.
#[must_use]
pub fn fallback_slot_min_width(max_cushion_width: f64, slots_per_label: Option<i64>) -> f64 {
    let per_label = slots_per_label.filter(|slots| *slots > 0).unwrap_or(1) as f64;
    MIN_FALLBACK_SLOT_WIDTH.max(max_cushion_width / per_label)
}
