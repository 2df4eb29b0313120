use chrono::NaiveDateTime;
use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid date range: start={start}, end={end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("snap duration {snap} does not evenly divide slot duration {slot}")]
    SnapNotWhole { slot: String, snap: String },

    #[error("snap count {snap_cnt} is not a whole multiple of {snaps_per_slot} snaps per slot")]
    SlotCountNotWhole { snap_cnt: usize, snaps_per_slot: u32 },

    #[error("profile has {slot_dates} slot dates but {slot_cnt} slots")]
    InconsistentSlots { slot_dates: usize, slot_cnt: usize },

    #[error("cell geometry mismatch: expected {expected} slots, got {actual}")]
    GeometryMismatch { expected: usize, actual: usize },

    #[error("slot cell geometry has not been measured yet")]
    MissingGeometry,

    #[error("invalid cell geometry: {0}")]
    InvalidGeometry(String),

    #[error("no timeline date profile has been built yet")]
    MissingProfile,
}
