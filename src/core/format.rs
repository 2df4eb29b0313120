use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Unit a header row navigates to when one of its cells is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowUnit {
    Year,
    Month,
    Week,
    Day,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumericStyle {
    Numeric,
    TwoDigit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthStyle {
    Numeric,
    TwoDigit,
    Narrow,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Narrow,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeridiemStyle {
    /// `8pm`, `8:30pm`
    Short,
    /// `8p`
    Narrow,
    /// `8:30 pm`
    Lowercase,
}

/// Structured date format: every populated field contributes to the output.
///
/// A `week` field renders the week number alone and ignores the other date fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormatFields {
    pub year: Option<NumericStyle>,
    pub month: Option<MonthStyle>,
    pub day: Option<NumericStyle>,
    pub weekday: Option<TextStyle>,
    pub week: Option<TextStyle>,
    pub hour: Option<NumericStyle>,
    pub minute: Option<NumericStyle>,
    pub second: Option<NumericStyle>,
    pub meridiem: Option<MeridiemStyle>,
    pub omit_zero_minute: bool,
    pub omit_commas: bool,
}

impl DateFormatFields {
    /// Largest calendar field present, used for header-cell navigation.
    #[must_use]
    pub fn largest_unit(&self) -> RowUnit {
        if self.year.is_some() {
            RowUnit::Year
        } else if self.month.is_some() {
            RowUnit::Month
        } else if self.week.is_some() {
            RowUnit::Week
        } else if self.day.is_some() || self.weekday.is_some() {
            RowUnit::Day
        } else {
            RowUnit::Time
        }
    }

    #[must_use]
    pub fn render(&self, context: &FormatContext) -> String {
        if let Some(style) = self.week {
            return render_week(context.week_number, &context.week_text, style);
        }

        let date_part = self.render_date_part(context.date);
        let time_part = self.render_time_part(context.date);
        match (date_part.is_empty(), time_part.is_empty()) {
            (false, false) => format!("{date_part} {time_part}"),
            (false, true) => date_part,
            (true, _) => time_part,
        }
    }

    fn render_date_part(&self, date: NaiveDateTime) -> String {
        let year = self.year.map(|style| match style {
            NumericStyle::Numeric => "%Y",
            NumericStyle::TwoDigit => "%y",
        });
        let day = self.day.map(|style| match style {
            NumericStyle::Numeric => "%-d",
            NumericStyle::TwoDigit => "%d",
        });

        let calendar = match self.month {
            Some(style @ (MonthStyle::Narrow | MonthStyle::Short | MonthStyle::Long)) => {
                let name = match style {
                    MonthStyle::Long => "%B".to_owned(),
                    MonthStyle::Short => "%b".to_owned(),
                    _ => initial(date, "%b"),
                };
                match (day, year) {
                    (Some(day), Some(year)) => format!("{name} {day}, {year}"),
                    (Some(day), None) => format!("{name} {day}"),
                    (None, Some(year)) => format!("{name} {year}"),
                    (None, None) => name,
                }
            }
            Some(style) => {
                let month = if style == MonthStyle::TwoDigit {
                    "%m"
                } else {
                    "%-m"
                };
                [Some(month), day, year]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join("/")
            }
            None => [day, year].into_iter().flatten().collect::<Vec<_>>().join(" "),
        };

        let weekday = self.weekday.map(|style| match style {
            TextStyle::Long => "%A".to_owned(),
            TextStyle::Short => "%a".to_owned(),
            TextStyle::Narrow => initial(date, "%a"),
        });

        let pattern = match weekday {
            Some(weekday) if calendar.is_empty() => weekday,
            Some(weekday) if self.omit_commas || self.month.is_none() => {
                format!("{weekday} {calendar}")
            }
            Some(weekday) => format!("{weekday}, {calendar}"),
            None => calendar,
        };
        date.format(&pattern).to_string()
    }

    fn render_time_part(&self, date: NaiveDateTime) -> String {
        let Some(hour_style) = self.hour else {
            return self
                .minute
                .map(|_| date.format("%M").to_string())
                .unwrap_or_default();
        };

        let mut pattern = match (self.meridiem.is_some(), hour_style) {
            (true, NumericStyle::Numeric) => "%-I",
            (true, NumericStyle::TwoDigit) => "%I",
            (false, NumericStyle::Numeric) => "%-H",
            (false, NumericStyle::TwoDigit) => "%H",
        }
        .to_owned();

        let show_minute = self.minute.is_some()
            && !(self.omit_zero_minute && date.minute() == 0 && self.second.is_none());
        if show_minute || self.second.is_some() {
            pattern.push_str(":%M");
        }
        if self.second.is_some() {
            pattern.push_str(":%S");
        }

        match self.meridiem {
            Some(MeridiemStyle::Short) => pattern.push_str("%P"),
            Some(MeridiemStyle::Narrow) => pattern.push_str(&initial(date, "%P")),
            Some(MeridiemStyle::Lowercase) => pattern.push_str(" %P"),
            None => {}
        }
        date.format(&pattern).to_string()
    }
}

/// First letter of a rendered name, for narrow month, weekday and meridiem styles.
fn initial(date: NaiveDateTime, specifier: &str) -> String {
    date.format(specifier)
        .to_string()
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_default()
}

fn render_week(week_number: u32, week_text: &str, style: TextStyle) -> String {
    match style {
        TextStyle::Narrow => format!("{week_text}{week_number}"),
        TextStyle::Short => format!("{week_text} {week_number}"),
        TextStyle::Long => format!("Week {week_number}"),
    }
}

/// Inputs available to a header-label formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatContext {
    pub date: NaiveDateTime,
    pub week_number: u32,
    pub week_text: String,
}

impl FormatContext {
    #[must_use]
    pub fn millisecond(&self) -> u32 {
        self.date.nanosecond() / 1_000_000
    }
}

pub type CustomFormatFn = Arc<dyn Fn(&FormatContext) -> String + Send + Sync + 'static>;

/// One header row's label format.
#[derive(Clone)]
pub enum SlotLabelFormat {
    Fields(DateFormatFields),
    Custom(CustomFormatFn),
}

impl SlotLabelFormat {
    #[must_use]
    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(&FormatContext) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(render))
    }

    #[must_use]
    pub fn render(&self, context: &FormatContext) -> String {
        match self {
            Self::Fields(fields) => fields.render(context),
            Self::Custom(render) => render(context),
        }
    }

    /// Navigation unit for cells of this row; custom formats carry none.
    #[must_use]
    pub fn largest_unit(&self) -> Option<RowUnit> {
        match self {
            Self::Fields(fields) => Some(fields.largest_unit()),
            Self::Custom(_) => None,
        }
    }
}

impl From<DateFormatFields> for SlotLabelFormat {
    fn from(fields: DateFormatFields) -> Self {
        Self::Fields(fields)
    }
}

impl fmt::Debug for SlotLabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            Self::Custom(render) => f
                .debug_tuple("Custom")
                .field(&format_args!("{:p}", Arc::as_ptr(render)))
                .finish(),
        }
    }
}

impl PartialEq for SlotLabelFormat {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fields(left), Self::Fields(right)) => left == right,
            (Self::Custom(left), Self::Custom(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn context(y: i32, m: u32, d: u32, h: u32, min: u32) -> FormatContext {
        FormatContext {
            date: NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|day| day.and_hms_opt(h, min, 0))
                .expect("valid date"),
            week_number: 14,
            week_text: "W".to_owned(),
        }
    }

    #[test]
    fn hour_labels_drop_zero_minutes() {
        let fields = DateFormatFields {
            hour: Some(NumericStyle::Numeric),
            minute: Some(NumericStyle::TwoDigit),
            omit_zero_minute: true,
            meridiem: Some(MeridiemStyle::Short),
            ..DateFormatFields::default()
        };
        assert_eq!(fields.render(&context(2020, 4, 7, 0, 0)), "12am");
        assert_eq!(fields.render(&context(2020, 4, 7, 13, 30)), "1:30pm");
    }

    #[test]
    fn weekday_with_numeric_date_honors_omit_commas() {
        let fields = DateFormatFields {
            weekday: Some(TextStyle::Short),
            day: Some(NumericStyle::Numeric),
            month: Some(MonthStyle::Numeric),
            omit_commas: true,
            ..DateFormatFields::default()
        };
        assert_eq!(fields.render(&context(2020, 4, 7, 0, 0)), "Tue 4/7");
    }

    #[test]
    fn week_field_renders_number_only() {
        let fields = DateFormatFields {
            week: Some(TextStyle::Narrow),
            year: Some(NumericStyle::Numeric),
            ..DateFormatFields::default()
        };
        assert_eq!(fields.render(&context(2020, 4, 7, 0, 0)), "W14");
        assert_eq!(fields.largest_unit(), RowUnit::Year);
    }

    #[test]
    fn month_and_weekday_names_come_from_chrono() {
        let long = DateFormatFields {
            weekday: Some(TextStyle::Long),
            month: Some(MonthStyle::Long),
            day: Some(NumericStyle::Numeric),
            year: Some(NumericStyle::Numeric),
            ..DateFormatFields::default()
        };
        assert_eq!(
            long.render(&context(2020, 4, 7, 0, 0)),
            "Tuesday, April 7, 2020"
        );

        let narrow = DateFormatFields {
            weekday: Some(TextStyle::Narrow),
            month: Some(MonthStyle::Narrow),
            ..DateFormatFields::default()
        };
        assert_eq!(narrow.render(&context(2020, 4, 7, 0, 0)), "T, A");
    }

    #[test]
    fn clock_with_seconds_and_two_digit_fields() {
        let fields = DateFormatFields {
            hour: Some(NumericStyle::TwoDigit),
            minute: Some(NumericStyle::TwoDigit),
            second: Some(NumericStyle::TwoDigit),
            meridiem: Some(MeridiemStyle::Lowercase),
            ..DateFormatFields::default()
        };
        assert_eq!(fields.render(&context(2020, 4, 7, 21, 5)), "09:05:00 pm");

        let numeric = DateFormatFields {
            month: Some(MonthStyle::TwoDigit),
            day: Some(NumericStyle::TwoDigit),
            year: Some(NumericStyle::TwoDigit),
            ..DateFormatFields::default()
        };
        assert_eq!(numeric.render(&context(2020, 4, 7, 0, 0)), "04/07/20");
    }
}
