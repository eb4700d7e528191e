use std::fmt::Display;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use snafu::ResultExt;

use crate::{
    DateRangeError, ParseTimestampError,
    date_range_error::{NonPositiveWindowSnafu, OrderingSnafu},
    parse_timestamp_error::{CompactSnafu, InvalidSnafu},
};

/// Format the provider expects for window bounds, minute precision, implicitly UTC.
pub const PROVIDER_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Largest span requested from the provider in a single positions call.
pub fn default_max_window() -> Duration {
    Duration::days(6)
}

/// A half-open `[start, end)` UTC range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// One sub-range of a [`DateRange`], sent to the provider as a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Iterator over the consecutive windows of a [`DateRange`], left to right.
#[derive(Debug, Clone)]
pub struct Windows {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    max_window: Duration,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<DateRange, DateRangeError> {
        if start >= end {
            OrderingSnafu { start, end }.fail()
        } else {
            Ok(DateRange { start, end })
        }
    }

    /// The range of length `duration` ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, duration: Duration) -> Result<DateRange, DateRangeError> {
        Self::new(end - duration, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, val: DateTime<Utc>) -> bool {
        val >= self.start && val < self.end
    }

    /// Splits the range into contiguous windows of at most `max_window`, the last one clipped
    /// to the end of the range.
    pub fn windows(&self, max_window: Duration) -> Result<Windows, DateRangeError> {
        if max_window <= Duration::zero() {
            return NonPositiveWindowSnafu { window: max_window }.fail();
        }

        Ok(Windows {
            cursor: self.start,
            end: self.end,
            max_window,
        })
    }
}

impl Iterator for Windows {
    type Item = FetchWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }

        let end = match self.cursor.checked_add_signed(self.max_window) {
            Some(v) if v < self.end => v,
            _ => self.end,
        };

        let window = FetchWindow {
            start: self.cursor,
            end,
        };
        self.cursor = end;

        Some(window)
    }
}

impl FetchWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn provider_start(&self) -> String {
        format_provider_timestamp(&self.start)
    }

    pub fn provider_end(&self) -> String {
        format_provider_timestamp(&self.end)
    }
}

impl Display for FetchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

impl From<FetchWindow> for DateRange {
    fn from(v: FetchWindow) -> Self {
        Self {
            start: v.start,
            end: v.end,
        }
    }
}

pub fn format_provider_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(PROVIDER_TIMESTAMP_FORMAT).to_string()
}

/// Parses the provider's `YYYYMMDDHHmm` format.
pub fn parse_provider_timestamp(val: &str) -> Result<DateTime<Utc>, ParseTimestampError> {
    if val.len() != 12 || !val.bytes().all(|b| b.is_ascii_digit()) {
        return CompactSnafu { value: val }.fail();
    }

    let part = |range: std::ops::Range<usize>| -> Result<u32, ParseTimestampError> {
        val[range]
            .parse::<u32>()
            .map_err(|_| CompactSnafu { value: val }.build())
    };

    let year = part(0..4)? as i32;
    let month = part(4..6)?;
    let day = part(6..8)?;
    let hour = part(8..10)?;
    let minute = part(10..12)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CompactSnafu { value: val }.build())?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| CompactSnafu { value: val }.build())?;

    Ok(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
}

/// Parses an ISO-8601-like timestamp. Values without an offset are taken as UTC.
pub fn parse_iso_timestamp(val: &str) -> Result<DateTime<Utc>, ParseTimestampError> {
    if let Ok(v) = DateTime::parse_from_rfc3339(val) {
        return Ok(v.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(val, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(val, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|v| Utc.from_utc_datetime(&v))
        .context(InvalidSnafu { value: val })
}

/// Accepts either the provider's compact format or an ISO-8601-like timestamp.
pub fn parse_timestamp(val: &str) -> Result<DateTime<Utc>, ParseTimestampError> {
    let val = val.trim();
    if val.bytes().all(|b| b.is_ascii_digit()) {
        parse_provider_timestamp(val)
    } else {
        parse_iso_timestamp(val)
    }
}
