//! Time and timestamp helpers.
//!
//! Scene resolution works on the local wall clock: a part that starts at
//! `06:00:00` starts at six in the morning where the house is, whatever the
//! UTC offset.

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Weekday};

use crate::error::TimeOfDayError;

/// Local wall-clock timestamp captured once per tick.
pub type LocalTimestamp = NaiveDateTime;

/// Format used for part start times in configuration.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Format used for date override keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Return the current local time.
#[must_use]
pub fn now() -> LocalTimestamp {
    Local::now().naive_local()
}

/// English full name of a weekday, as used in override declarations.
#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Parse an English full weekday name (`"Monday"`). Case-insensitive.
#[must_use]
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    WEEKDAYS
        .into_iter()
        .find(|day| weekday_name(*day).eq_ignore_ascii_case(name.trim()))
}

/// Weekday of a timestamp.
#[must_use]
pub fn weekday_of(ts: LocalTimestamp) -> Weekday {
    ts.date().weekday()
}

/// Parse a part start time in `HH:MM:SS` form.
///
/// # Errors
///
/// Returns [`TimeOfDayError`] when the value does not match the format.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, TimeOfDayError> {
    NaiveTime::parse_from_str(value.trim(), TIME_OF_DAY_FORMAT).map_err(|source| TimeOfDayError {
        value: value.to_string(),
        source,
    })
}
