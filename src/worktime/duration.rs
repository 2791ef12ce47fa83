use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Unpaid break subtracted from every shift, whatever its length.
pub const BREAK_MINUTES: u32 = 120;

/// Weekday labels, index 0 = Sunday.
pub const DAYS_OF_WEEK: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

pub const ZERO_DURATION: &str = "0時間00分";
pub const INVALID_DURATION: &str = "無効な時間";
pub const REVERSED_DURATION: &str = "0時間00分 (終了<開始)";

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("time must be formatted as HH:MM, got {0:?}")]
    Format(String),
    #[error("time out of range: {0:?}")]
    OutOfRange(String),
}

/// A wall-clock time within one calendar day, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (hour, minute) = raw
            .split_once(':')
            .ok_or_else(|| TimeParseError::Format(s.to_string()))?;

        let parse_part = |part: &str| -> Result<u32, TimeParseError> {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimeParseError::Format(s.to_string()));
            }
            part.parse()
                .map_err(|_| TimeParseError::Format(s.to_string()))
        };

        let hour = parse_part(hour)?;
        let minute = parse_part(minute)?;
        if hour > 23 || minute > 59 {
            return Err(TimeParseError::OutOfRange(s.to_string()));
        }
        Ok(Self(hour * 60 + minute))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Net worked time after the break deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetDuration {
    pub minutes: u32,
}

impl NetDuration {
    /// Gross span minus [`BREAK_MINUTES`], floored at zero.
    pub fn between(start: TimeOfDay, end: TimeOfDay) -> Option<Self> {
        let gross = end.minutes().checked_sub(start.minutes())?;
        Some(Self {
            minutes: gross.saturating_sub(BREAK_MINUTES),
        })
    }
}

impl fmt::Display for NetDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}時間{:02}分", self.minutes / 60, self.minutes % 60)
    }
}

/// Maps a calendar date to its weekday label.
pub fn day_of_week(date: NaiveDate) -> &'static str {
    DAYS_OF_WEEK[date.weekday().num_days_from_sunday() as usize]
}

/// Same as [`day_of_week`] for an ISO `YYYY-MM-DD` string; blank or
/// unparsable input yields an empty label.
pub fn day_of_week_label(date: &str) -> &'static str {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(day_of_week)
        .unwrap_or("")
}

/// True iff both times parse and `end` is strictly later than `start`
/// on the same day. Overnight spans are rejected.
pub fn is_valid_range(start: &str, end: &str) -> bool {
    if start.trim().is_empty() || end.trim().is_empty() {
        return false;
    }
    match (start.parse::<TimeOfDay>(), end.parse::<TimeOfDay>()) {
        (Ok(start), Ok(end)) => end > start,
        _ => false,
    }
}

/// Formats the net worked duration between two `HH:MM` times.
///
/// Missing input gives [`ZERO_DURATION`], unparsable input gives
/// [`INVALID_DURATION`] and an end before the start gives the flagged
/// [`REVERSED_DURATION`] instead of a negative value.
pub fn work_duration(start: &str, end: &str) -> String {
    if start.trim().is_empty() || end.trim().is_empty() {
        return ZERO_DURATION.to_string();
    }
    let (Ok(start), Ok(end)) = (start.parse::<TimeOfDay>(), end.parse::<TimeOfDay>()) else {
        return INVALID_DURATION.to_string();
    };
    match NetDuration::between(start, end) {
        Some(net) => net.to_string(),
        None => REVERSED_DURATION.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeOption {
    #[schema(example = "09:15")]
    pub value: String,
    #[schema(example = "09:15")]
    pub label: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("interval must be between 1 and 60 minutes and divide 60 evenly, got {0}")]
pub struct InvalidInterval(pub u32);

/// Every `HH:MM` from `00:00` up to (not including) `24:00`, stepping by
/// `interval_minutes`.
pub fn time_options(interval_minutes: u32) -> Result<Vec<TimeOption>, InvalidInterval> {
    if interval_minutes == 0 || interval_minutes > 60 || 60 % interval_minutes != 0 {
        return Err(InvalidInterval(interval_minutes));
    }

    Ok((0..MINUTES_PER_DAY)
        .step_by(interval_minutes as usize)
        .map(|minutes| {
            let value = TimeOfDay(minutes).to_string();
            TimeOption {
                label: value.clone(),
                value,
            }
        })
        .collect())
}
