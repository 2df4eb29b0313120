use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::core::{CalendarDuration, SlotLabelFormat};
use crate::error::{TimelineError, TimelineResult};
use crate::layout::EventOrderSpec;
use crate::render::LayoutDirection;

/// Tunables bounding how many cells the resolver may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GranularityLimits {
    /// Hard ceiling on label or slot occurrences for user-supplied values.
    pub max_timeline_slots: u32,
    /// Largest slots-per-label ratio accepted while auto-deriving.
    pub max_auto_slots_per_label: u32,
    /// Ceiling on slot occurrences for an auto-derived slot duration.
    pub max_auto_cells: u32,
    /// Minimum label occurrences when auto-deriving the label interval.
    pub min_auto_labels: u32,
}

impl Default for GranularityLimits {
    fn default() -> Self {
        Self {
            max_timeline_slots: 1000,
            max_auto_slots_per_label: 6,
            max_auto_cells: 200,
            min_auto_labels: 18,
        }
    }
}

impl GranularityLimits {
    pub fn validate(self) -> TimelineResult<Self> {
        for (value, name) in [
            (self.max_timeline_slots, "max_timeline_slots"),
            (self.max_auto_slots_per_label, "max_auto_slots_per_label"),
            (self.max_auto_cells, "max_auto_cells"),
            (self.min_auto_labels, "min_auto_labels"),
        ] {
            if value == 0 {
                return Err(TimelineError::InvalidConfig(format!(
                    "granularity limit `{name}` must be > 0"
                )));
            }
        }
        if self.max_auto_cells > self.max_timeline_slots {
            return Err(TimelineError::InvalidConfig(
                "max_auto_cells must not exceed max_timeline_slots".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Host-owned timeline configuration.
///
/// Serializable so hosts can persist view setup; `slot_label_format` holds
/// closures and is therefore programmatic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    pub slot_duration: Option<CalendarDuration>,
    pub slot_label_interval: Option<CalendarDuration>,
    pub snap_duration: Option<CalendarDuration>,
    #[serde(skip)]
    pub slot_label_format: Option<Vec<SlotLabelFormat>>,
    pub slot_min_width: Option<f64>,
    pub week_numbers: bool,
    pub business_hours: bool,
    pub next_day_threshold: CalendarDuration,
    pub first_day: Weekday,
    pub direction: LayoutDirection,
    pub event_order: Vec<EventOrderSpec>,
    pub limits: GranularityLimits,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            slot_duration: None,
            slot_label_interval: None,
            snap_duration: None,
            slot_label_format: None,
            slot_min_width: None,
            week_numbers: false,
            business_hours: false,
            next_day_threshold: CalendarDuration::ZERO,
            first_day: Weekday::Mon,
            direction: LayoutDirection::LeftToRight,
            event_order: EventOrderSpec::default_order(),
            limits: GranularityLimits::default(),
        }
    }
}

impl TimelineOptions {
    #[must_use]
    pub fn with_slot_duration(mut self, duration: CalendarDuration) -> Self {
        self.slot_duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_slot_label_interval(mut self, interval: CalendarDuration) -> Self {
        self.slot_label_interval = Some(interval);
        self
    }

    #[must_use]
    pub fn with_snap_duration(mut self, duration: CalendarDuration) -> Self {
        self.snap_duration = Some(duration);
        self
    }

    #[must_use]
    pub fn with_slot_label_format(mut self, formats: Vec<SlotLabelFormat>) -> Self {
        self.slot_label_format = Some(formats);
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Loads options from JSON, validating the result.
    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        let options: Self = serde_json::from_str(input)
            .map_err(|err| TimelineError::InvalidConfig(format!("options json: {err}")))?;
        options.validate()
    }

    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| TimelineError::InvalidConfig(format!("options json: {err}")))
    }

    pub fn validate(self) -> TimelineResult<Self> {
        self.limits.validate()?;
        if let Some(width) = self.slot_min_width {
            if !width.is_finite() || width < 0.0 {
                return Err(TimelineError::InvalidConfig(
                    "slot_min_width must be finite and >= 0".to_owned(),
                ));
            }
        }
        if matches!(&self.slot_label_format, Some(formats) if formats.is_empty()) {
            return Err(TimelineError::InvalidConfig(
                "slot_label_format must contain at least one format".to_owned(),
            ));
        }
        Ok(self)
    }
}
