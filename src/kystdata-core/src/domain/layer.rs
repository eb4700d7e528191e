use serde::Serialize;

use crate::{Mmsi, Position};

/// Speed over ground, in knots, separating the two styling buckets of a position layer.
pub const SLOW_SPEED_THRESHOLD_KNOTS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpeedBucket {
    /// Below the threshold, or no reported speed.
    Slow,
    /// At or above the threshold.
    Moving,
}

/// Handle to a layer owned by a [`crate::LayerSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

impl SpeedBucket {
    pub fn of(position: &Position) -> SpeedBucket {
        match position.speed_over_ground {
            Some(v) if v >= SLOW_SPEED_THRESHOLD_KNOTS => SpeedBucket::Moving,
            _ => SpeedBucket::Slow,
        }
    }
}

pub fn layer_name(mmsi: Mmsi) -> String {
    format!("AIS Positions for {mmsi}")
}
