pub mod date_env;
pub mod date_profile;
pub mod duration;
pub mod format;
pub mod range;

pub use date_env::{DateEnv, time_of_day_ms};
pub use date_profile::{DateProfile, HiddenDayPredicate, HiddenDays};
pub use duration::{CalendarDuration, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, TimeUnit};
pub use format::{
    CustomFormatFn, DateFormatFields, FormatContext, MeridiemStyle, MonthStyle, NumericStyle,
    RowUnit, SlotLabelFormat, TextStyle,
};
pub use range::DateRange;
