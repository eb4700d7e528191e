use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    MmsiError,
    mmsi_error::{OutOfRangeSnafu, ParseSnafu},
};

pub const MMSI_MIN: i32 = 100_000_000;
pub const MMSI_MAX: i32 = 999_999_999;

/// Maritime Mobile Service Identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct Mmsi(i32);

/// A single AIS position report as delivered by the provider, in the provider's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub mmsi: Mmsi,
    pub timestamp: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    pub course_over_ground: Option<f64>,
    pub speed_over_ground: Option<f64>,
    pub ais_message_type: Option<i32>,
    pub calculated_speed: Option<f64>,
    pub seconds_since_previous: Option<f64>,
    pub distance_since_previous: Option<f64>,
}

impl Mmsi {
    /// Accepts only 9-digit identifiers.
    pub fn new(value: i64) -> Result<Self, MmsiError> {
        Self::checked(value, MMSI_MIN as i64, MMSI_MAX as i64)
    }

    /// Accepts any positive identifier up to the 9-digit maximum.
    pub fn new_loose(value: i64) -> Result<Self, MmsiError> {
        Self::checked(value, 1, MMSI_MAX as i64)
    }

    fn checked(value: i64, min: i64, max: i64) -> Result<Self, MmsiError> {
        if (min..=max).contains(&value) {
            Ok(Self(value as i32))
        } else {
            OutOfRangeSnafu { value, min, max }.fail()
        }
    }

    pub fn into_inner(self) -> i32 {
        self.0
    }
}

impl Position {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl FromStr for Mmsi {
    type Err = MmsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<i64>().context(ParseSnafu { value: s })?;
        Self::new(value)
    }
}

impl From<Mmsi> for i32 {
    fn from(value: Mmsi) -> Self {
        value.0
    }
}

impl Display for Mmsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(any(test, feature = "test"))]
mod test {
    use super::*;

    impl Mmsi {
        pub fn test_new(mmsi: i32) -> Self {
            Self(mmsi)
        }
    }

    impl Position {
        pub fn test_default(mmsi: Mmsi, timestamp: DateTime<Utc>) -> Position {
            Position {
                mmsi,
                timestamp,
                longitude: 21.7261,
                latitude: 70.4006,
                course_over_ground: Some(115.3),
                speed_over_ground: Some(15.1),
                ais_message_type: Some(3),
                calculated_speed: Some(40.8),
                seconds_since_previous: Some(1.),
                distance_since_previous: Some(21.),
            }
        }
    }
}
