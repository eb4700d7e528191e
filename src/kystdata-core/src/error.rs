use chrono::{DateTime, Duration, Utc};
use snafu::{Location, Snafu};

pub type CoreResult<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("An unexpected error occured"))]
    Unexpected {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum MmsiError {
    #[snafu(display("MMSI '{value}' is outside the range '{min}..={max}'"))]
    OutOfRange {
        #[snafu(implicit)]
        location: Location,
        value: i64,
        min: i64,
        max: i64,
    },
    #[snafu(display("Failed to parse MMSI '{value}'"))]
    Parse {
        #[snafu(implicit)]
        location: Location,
        value: String,
        #[snafu(source)]
        error: std::num::ParseIntError,
    },
}

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum DateRangeError {
    #[snafu(display("Start of range '{start}' is not before its end '{end}'"))]
    Ordering {
        #[snafu(implicit)]
        location: Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[snafu(display("Window size must be positive, got '{window}'"))]
    NonPositiveWindow {
        #[snafu(implicit)]
        location: Location,
        window: Duration,
    },
}

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum BoundingBoxError {
    #[snafu(display(
        "Invalid bounding box, lon: '{min_lon}..{max_lon}', lat: '{min_lat}..{max_lat}'"
    ))]
    Invalid {
        #[snafu(implicit)]
        location: Location,
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    },
}

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum ParseTimestampError {
    #[snafu(display("Timestamp '{value}' is not of the form 'YYYYMMDDHHmm'"))]
    Compact {
        #[snafu(implicit)]
        location: Location,
        value: String,
    },
    #[snafu(display("Failed to parse timestamp '{value}'"))]
    Invalid {
        #[snafu(implicit)]
        location: Location,
        value: String,
        #[snafu(source)]
        error: chrono::ParseError,
    },
}
