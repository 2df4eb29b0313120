use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

const ROUGH_DAYS_PER_YEAR: f64 = 365.0;
const ROUGH_DAYS_PER_MONTH: f64 = 30.0;

/// Calendar unit, ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

/// Calendar-aware duration.
///
/// Years, months and days are kept apart from the millisecond component so
/// that adding a duration follows the calendar (month lengths, leap years)
/// instead of fixed millisecond arithmetic. Weeks are stored as days;
/// `specified_weeks` remembers that the value was expressed in weeks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(try_from = "DurationRepr")]
pub struct CalendarDuration {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub milliseconds: i64,
    #[serde(default)]
    pub specified_weeks: bool,
}

impl PartialEq for CalendarDuration {
    fn eq(&self, other: &Self) -> bool {
        self.years == other.years
            && self.months == other.months
            && self.days == other.days
            && self.milliseconds == other.milliseconds
    }
}

impl Eq for CalendarDuration {}

impl Hash for CalendarDuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.years.hash(state);
        self.months.hash(state);
        self.days.hash(state);
        self.milliseconds.hash(state);
    }
}

impl CalendarDuration {
    pub const ZERO: Self = Self {
        years: 0,
        months: 0,
        days: 0,
        milliseconds: 0,
        specified_weeks: false,
    };

    #[must_use]
    pub const fn years(years: i32) -> Self {
        Self {
            years,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn months(months: i32) -> Self {
        Self {
            months,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn weeks(weeks: i32) -> Self {
        Self {
            days: weeks * 7,
            specified_weeks: true,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn days(days: i32) -> Self {
        Self {
            days,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub const fn hours(hours: i64) -> Self {
        Self::milliseconds(hours * MS_PER_HOUR)
    }

    #[must_use]
    pub const fn minutes(minutes: i64) -> Self {
        Self::milliseconds(minutes * MS_PER_MINUTE)
    }

    #[must_use]
    pub const fn seconds(seconds: i64) -> Self {
        Self::milliseconds(seconds * MS_PER_SECOND)
    }

    #[must_use]
    pub const fn milliseconds(milliseconds: i64) -> Self {
        Self {
            milliseconds,
            ..Self::ZERO
        }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// `true` when the duration carries a sub-day (millisecond) component.
    #[must_use]
    pub fn has_time_part(self) -> bool {
        self.milliseconds != 0
    }

    /// `true` for exactly one calendar day.
    #[must_use]
    pub fn is_single_day(self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 1 && self.milliseconds == 0
    }

    /// Finest unit that expresses the duration as a whole number, with that number.
    ///
    /// `{ hours: 2 }` yields `(Hour, 2)`, `{ minutes: 90 }` yields `(Minute, 90)`
    /// and `{ months: 1, days: 2 }` yields `(Day, 2)`.
    #[must_use]
    pub fn greatest_denominator(self) -> (TimeUnit, i64) {
        let ms = self.milliseconds;
        if ms != 0 {
            if ms % MS_PER_SECOND != 0 {
                return (TimeUnit::Millisecond, ms);
            }
            if ms % MS_PER_MINUTE != 0 {
                return (TimeUnit::Second, ms / MS_PER_SECOND);
            }
            if ms % MS_PER_HOUR != 0 {
                return (TimeUnit::Minute, ms / MS_PER_MINUTE);
            }
            return (TimeUnit::Hour, ms / MS_PER_HOUR);
        }
        if self.days != 0 {
            if self.specified_weeks && self.days % 7 == 0 {
                return (TimeUnit::Week, i64::from(self.days / 7));
            }
            return (TimeUnit::Day, i64::from(self.days));
        }
        if self.months != 0 {
            return (TimeUnit::Month, i64::from(self.months));
        }
        if self.years != 0 {
            return (TimeUnit::Year, i64::from(self.years));
        }
        (TimeUnit::Millisecond, 0)
    }

    /// Approximate length in milliseconds (365-day years, 30-day months).
    #[must_use]
    pub fn as_rough_ms(self) -> f64 {
        let day_ms = MS_PER_DAY as f64;
        f64::from(self.years) * ROUGH_DAYS_PER_YEAR * day_ms
            + f64::from(self.months) * ROUGH_DAYS_PER_MONTH * day_ms
            + f64::from(self.days) * day_ms
            + self.milliseconds as f64
    }

    #[must_use]
    pub fn as_rough_seconds(self) -> f64 {
        self.as_rough_ms() / MS_PER_SECOND as f64
    }

    #[must_use]
    pub fn as_rough_minutes(self) -> f64 {
        self.as_rough_ms() / MS_PER_MINUTE as f64
    }

    #[must_use]
    pub fn as_rough_days(self) -> f64 {
        self.as_rough_ms() / MS_PER_DAY as f64
    }

    #[must_use]
    pub fn as_rough_months(self) -> f64 {
        self.as_rough_days() / ROUGH_DAYS_PER_MONTH
    }

    #[must_use]
    pub fn as_rough_years(self) -> f64 {
        self.as_rough_days() / ROUGH_DAYS_PER_YEAR
    }

    /// Divides `self` by `denominator` component-wise.
    ///
    /// Returns `None` unless every component divides into the same whole
    /// quotient. A component present in `self` but absent from the
    /// denominator cannot be divided, so `{ days: 1 } / { hours: 1 }` is `None`.
    #[must_use]
    pub fn whole_divide(self, denominator: Self) -> Option<i64> {
        let components = [
            (i64::from(self.years), i64::from(denominator.years)),
            (i64::from(self.months), i64::from(denominator.months)),
            (i64::from(self.days), i64::from(denominator.days)),
            (self.milliseconds, denominator.milliseconds),
        ];

        let mut quotient = None;
        for (numerator, divisor) in components {
            if divisor != 0 {
                if numerator % divisor != 0 {
                    return None;
                }
                let local = numerator / divisor;
                match quotient {
                    Some(existing) if existing != local => return None,
                    _ => quotient = Some(local),
                }
            } else if numerator != 0 {
                return None;
            }
        }
        quotient
    }

    #[must_use]
    pub fn multiply(self, factor: i32) -> Self {
        Self {
            years: self.years * factor,
            months: self.months * factor,
            days: self.days * factor,
            milliseconds: self.milliseconds * i64::from(factor),
            specified_weeks: self.specified_weeks,
        }
    }
}

impl fmt::Display for CalendarDuration {
    /// ISO-8601 style rendering, e.g. `P1M`, `P1W`, `PT30M`, `PT0.5S`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("PT0S");
        }
        f.write_str("P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            if self.specified_weeks && self.days % 7 == 0 {
                write!(f, "{}W", self.days / 7)?;
            } else {
                write!(f, "{}D", self.days)?;
            }
        }
        if self.milliseconds != 0 {
            f.write_str("T")?;
            let mut rest = self.milliseconds;
            let hours = rest / MS_PER_HOUR;
            rest %= MS_PER_HOUR;
            let minutes = rest / MS_PER_MINUTE;
            rest %= MS_PER_MINUTE;
            if hours != 0 {
                write!(f, "{hours}H")?;
            }
            if minutes != 0 {
                write!(f, "{minutes}M")?;
            }
            if rest != 0 {
                if rest % MS_PER_SECOND == 0 {
                    write!(f, "{}S", rest / MS_PER_SECOND)?;
                } else {
                    let text = format!("{:.3}", rest as f64 / MS_PER_SECOND as f64);
                    write!(f, "{}S", text.trim_end_matches('0'))?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for CalendarDuration {
    type Err = TimelineError;

    /// Parses `[-][D.]HH:MM[:SS[.mmm]]`, e.g. `"00:30"`, `"1.06:00:00"`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_clock_duration(input.trim())
            .ok_or_else(|| TimelineError::InvalidDuration(format!("cannot parse `{input}`")))
    }
}

fn parse_clock_duration(input: &str) -> Option<CalendarDuration> {
    let (sign, body) = match input.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, input),
    };

    let (days, clock) = match body.split_once(':') {
        Some((head, _)) if head.contains('.') => {
            let (day_text, _) = head.split_once('.')?;
            (day_text.parse::<i32>().ok()?, &body[day_text.len() + 1..])
        }
        _ => (0, body),
    };

    let mut fields = clock.split(':');
    let hours = fields.next()?.parse::<i64>().ok()?;
    let minutes_text = fields.next()?;
    if minutes_text.len() != 2 {
        return None;
    }
    let minutes = minutes_text.parse::<i64>().ok()?;

    let (seconds, millis) = match fields.next() {
        None => (0, 0),
        Some(second_text) => {
            let (whole, fraction) = match second_text.split_once('.') {
                Some((whole, fraction)) if fraction.len() == 3 => {
                    (whole, fraction.parse::<i64>().ok()?)
                }
                Some(_) => return None,
                None => (second_text, 0),
            };
            if whole.len() != 2 {
                return None;
            }
            (whole.parse::<i64>().ok()?, fraction)
        }
    };
    if fields.next().is_some() {
        return None;
    }

    Some(CalendarDuration {
        days: days.checked_mul(sign)?,
        milliseconds: clock_ms(hours, minutes, seconds, millis)?.checked_mul(i64::from(sign))?,
        ..CalendarDuration::ZERO
    })
}

/// Total milliseconds of a clock reading, or `None` on overflow.
fn clock_ms(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Option<i64> {
    hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
        .checked_add(seconds.checked_mul(MS_PER_SECOND)?)?
        .checked_add(millis)
}

/// Accepted serialized forms: a clock string or an object of named components.
#[derive(Deserialize)]
#[serde(untagged)]
enum DurationRepr {
    Text(String),
    Fields {
        #[serde(default)]
        years: i32,
        #[serde(default)]
        months: i32,
        #[serde(default)]
        weeks: i32,
        #[serde(default)]
        days: i32,
        #[serde(default)]
        hours: i64,
        #[serde(default)]
        minutes: i64,
        #[serde(default)]
        seconds: i64,
        #[serde(default)]
        milliseconds: i64,
        #[serde(default)]
        specified_weeks: bool,
    },
}

impl TryFrom<DurationRepr> for CalendarDuration {
    type Error = TimelineError;

    fn try_from(repr: DurationRepr) -> TimelineResult<Self> {
        match repr {
            DurationRepr::Text(text) => text.parse(),
            DurationRepr::Fields {
                years,
                months,
                weeks,
                days,
                hours,
                minutes,
                seconds,
                milliseconds,
                specified_weeks,
            } => {
                let overflow = || {
                    TimelineError::InvalidDuration(
                        "duration components overflow the representable range".to_owned(),
                    )
                };
                let total_days = weeks
                    .checked_mul(7)
                    .and_then(|week_days| week_days.checked_add(days))
                    .ok_or_else(overflow)?;
                let total_ms =
                    clock_ms(hours, minutes, seconds, milliseconds).ok_or_else(overflow)?;
                Ok(Self {
                    years,
                    months,
                    days: total_days,
                    milliseconds: total_ms,
                    specified_weeks: specified_weeks || (weeks != 0 && days == 0),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarDuration, TimeUnit};

    #[test]
    fn greatest_denominator_prefers_finest_whole_unit() {
        assert_eq!(
            CalendarDuration::minutes(90).greatest_denominator(),
            (TimeUnit::Minute, 90)
        );
        assert_eq!(
            CalendarDuration::hours(2).greatest_denominator(),
            (TimeUnit::Hour, 2)
        );
        assert_eq!(
            CalendarDuration::weeks(2).greatest_denominator(),
            (TimeUnit::Week, 2)
        );
        assert_eq!(
            CalendarDuration::days(14).greatest_denominator(),
            (TimeUnit::Day, 14)
        );
    }

    #[test]
    fn whole_divide_rejects_mixed_units() {
        assert_eq!(
            CalendarDuration::hours(1).whole_divide(CalendarDuration::minutes(15)),
            Some(4)
        );
        assert_eq!(
            CalendarDuration::days(1).whole_divide(CalendarDuration::hours(1)),
            None
        );
        assert_eq!(
            CalendarDuration::hours(1).whole_divide(CalendarDuration::minutes(25)),
            None
        );
        assert_eq!(
            CalendarDuration::years(1).whole_divide(CalendarDuration::months(1)),
            None
        );
    }

    #[test]
    fn clock_strings_parse_into_milliseconds() {
        let parsed: CalendarDuration = "01:30".parse().expect("clock");
        assert_eq!(parsed, CalendarDuration::minutes(90));

        let with_days: CalendarDuration = "1.06:00:00".parse().expect("days");
        assert_eq!(with_days.days, 1);
        assert_eq!(with_days.milliseconds, 6 * super::MS_PER_HOUR);

        let with_millis: CalendarDuration = "00:00:01.500".parse().expect("millis");
        assert_eq!(with_millis, CalendarDuration::milliseconds(1_500));

        assert!("1:3".parse::<CalendarDuration>().is_err());
        assert!("soon".parse::<CalendarDuration>().is_err());
    }

    #[test]
    fn oversized_clock_strings_are_rejected() {
        assert!("99999999999999:00".parse::<CalendarDuration>().is_err());
        assert!("-3000000000.00:00".parse::<CalendarDuration>().is_err());
        assert!("-9223372036854775807:00".parse::<CalendarDuration>().is_err());
    }

    #[test]
    fn display_uses_iso_designators() {
        assert_eq!(CalendarDuration::weeks(1).to_string(), "P1W");
        assert_eq!(CalendarDuration::minutes(30).to_string(), "PT30M");
        assert_eq!(CalendarDuration::milliseconds(500).to_string(), "PT0.5S");
        assert_eq!(CalendarDuration::months(1).to_string(), "P1M");
    }
}
