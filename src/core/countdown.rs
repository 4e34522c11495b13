//! Pure countdown arithmetic: target resolution, unit breakdown, and field
//! formatting. Nothing here reads the clock or touches a display.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

use crate::core::error::{Error, Result};

pub const MS_PER_SECOND: u64 = 1_000;
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Text shown in every slot once the target has been reached.
pub const EXPIRED_FIELD: &str = "00";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// The fixed instant the countdown runs toward, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Target(i64);

impl Target {
    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parses RFC 3339 (explicit offset), a naive date/time read in the
    /// host's local time zone, or a bare `YYYY-MM-DD`, which is UTC midnight
    /// the way ECMAScript date-only forms are.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_in(raw, &Local)
    }

    /// Like [`Target::parse`] but resolves naive date/time inputs in `tz`.
    pub fn parse_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidTarget("target must not be blank".into()));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self(dt.timestamp_millis()));
        }
        if let Some(naive) = parse_naive_datetime(trimmed) {
            return Self::from_naive_in(naive, tz);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| Self(midnight.and_utc().timestamp_millis()))
            .ok_or_else(|| {
                Error::InvalidTarget(format!(
                    "'{trimmed}' is neither RFC 3339 nor YYYY-MM-DD[THH:MM[:SS]]"
                ))
            })
    }

    pub fn from_naive_in<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Result<Self> {
        naive
            .and_local_timezone(tz.clone())
            .earliest()
            .map(|dt| Self(dt.timestamp_millis()))
            .ok_or_else(|| {
                Error::InvalidTarget(format!("{naive} does not exist in the configured time zone"))
            })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

fn parse_naive_datetime(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Display slots written on every update, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Days, Slot::Hours, Slot::Minutes, Slot::Seconds];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Days => "days",
            Slot::Hours => "hours",
            Slot::Minutes => "minutes",
            Slot::Seconds => "seconds",
        }
    }

    /// Single-letter unit suffix used by terminal rendering.
    pub fn unit(self) -> char {
        match self {
            Slot::Days => 'd',
            Slot::Hours => 'h',
            Slot::Minutes => 'm',
            Slot::Seconds => 's',
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole units left before the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Remaining {
    /// Floor-division breakdown of a positive millisecond difference.
    pub fn from_millis(ms: u64) -> Self {
        Self {
            days: ms / MS_PER_DAY,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

/// Formatted slot contents for one update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl DisplayFields {
    pub fn from_remaining(remaining: &Remaining) -> Self {
        Self {
            days: pad_field(remaining.days),
            hours: pad_field(remaining.hours),
            minutes: pad_field(remaining.minutes),
            seconds: pad_field(remaining.seconds),
        }
    }

    pub fn expired() -> Self {
        Self {
            days: EXPIRED_FIELD.to_string(),
            hours: EXPIRED_FIELD.to_string(),
            minutes: EXPIRED_FIELD.to_string(),
            seconds: EXPIRED_FIELD.to_string(),
        }
    }

    pub fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Days => &self.days,
            Slot::Hours => &self.hours,
            Slot::Minutes => &self.minutes,
            Slot::Seconds => &self.seconds,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> {
        Slot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

/// Left-pads with `0` to two characters; wider values are kept intact.
pub fn pad_field(value: u64) -> String {
    format!("{value:02}")
}

/// Outcome of a single countdown evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub target_ms: i64,
    pub now_ms: i64,
    pub remaining_ms: u64,
    pub expired: bool,
    pub remaining: Remaining,
    pub fields: DisplayFields,
}

/// Computes what the four slots should show at `now_ms`.
///
/// A difference of zero or less counts as expired and every field reads
/// `"00"`.
pub fn evaluate(target: Target, now_ms: i64) -> Snapshot {
    let diff = target.as_millis().saturating_sub(now_ms);
    match u64::try_from(diff) {
        Ok(ms) if ms > 0 => {
            let remaining = Remaining::from_millis(ms);
            Snapshot {
                target_ms: target.as_millis(),
                now_ms,
                remaining_ms: ms,
                expired: false,
                fields: DisplayFields::from_remaining(&remaining),
                remaining,
            }
        }
        _ => Snapshot {
            target_ms: target.as_millis(),
            now_ms,
            remaining_ms: 0,
            expired: true,
            remaining: Remaining::default(),
            fields: DisplayFields::expired(),
        },
    }
}
