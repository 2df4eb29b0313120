use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::TimelineSegment;
use crate::core::DateRange;
use crate::error::TimelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventOrderField {
    Start,
    Duration,
    AllDay,
    Title,
}

/// One sort key for lane packing. Parses from `"title"` or `"-duration"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventOrderSpec {
    pub field: EventOrderField,
    #[serde(default)]
    pub descending: bool,
}

impl EventOrderSpec {
    #[must_use]
    pub const fn ascending(field: EventOrderField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    #[must_use]
    pub const fn descending(field: EventOrderField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Earlier first, then longer, then all-day, then by title.
    #[must_use]
    pub fn default_order() -> Vec<Self> {
        vec![
            Self::ascending(EventOrderField::Start),
            Self::descending(EventOrderField::Duration),
            Self::descending(EventOrderField::AllDay),
            Self::ascending(EventOrderField::Title),
        ]
    }

    fn compare(self, a: &LaneSegment, b: &LaneSegment) -> Ordering {
        let ordering = match self.field {
            EventOrderField::Start => a.event_range.start.cmp(&b.event_range.start),
            EventOrderField::Duration => a
                .event_range
                .duration_ms()
                .cmp(&b.event_range.duration_ms()),
            EventOrderField::AllDay => a.all_day.cmp(&b.all_day),
            EventOrderField::Title => a.title.cmp(&b.title),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl fmt::Display for EventOrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.field {
            EventOrderField::Start => "start",
            EventOrderField::Duration => "duration",
            EventOrderField::AllDay => "allDay",
            EventOrderField::Title => "title",
        };
        if self.descending {
            write!(f, "-{name}")
        } else {
            f.write_str(name)
        }
    }
}

impl FromStr for EventOrderSpec {
    type Err = TimelineError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (descending, name) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let field = match name {
            "start" => EventOrderField::Start,
            "duration" => EventOrderField::Duration,
            "allDay" => EventOrderField::AllDay,
            "title" => EventOrderField::Title,
            other => {
                return Err(TimelineError::InvalidConfig(format!(
                    "unknown event order field `{other}`"
                )));
            }
        };
        Ok(Self { field, descending })
    }
}

/// Parses a comma separated order list such as `"start,-duration,title"`.
pub fn parse_event_order(input: &str) -> Result<Vec<EventOrderSpec>, TimelineError> {
    input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse::<EventOrderSpec>)
        .collect()
}

/// Sliced segment of one event within a lane.
///
/// Ordering reads the full `event_range`, not the clipped segment, so an
/// event keeps its rank whichever part of it is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSegment {
    pub key: String,
    pub segment: TimelineSegment,
    pub event_range: DateRange,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub all_day: bool,
}

impl LaneSegment {
    #[must_use]
    pub fn new(key: impl Into<String>, segment: TimelineSegment, event_range: DateRange) -> Self {
        Self {
            key: key.into(),
            segment,
            event_range,
            title: String::new(),
            all_day: false,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }
}

/// Compares by each spec in turn, falling back to the segment key.
#[must_use]
pub fn compare_segments(a: &LaneSegment, b: &LaneSegment, order: &[EventOrderSpec]) -> Ordering {
    order
        .iter()
        .map(|spec| spec.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.key.cmp(&b.key))
}
