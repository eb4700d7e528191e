use kystdata_core::{Mmsi, Position, parse_iso_timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;

use crate::error::{
    RowError,
    row_error::{
        AritySnafu, CoordinatesSnafu, FieldSnafu, MmsiSnafu, NotArraySnafu, TimestampSnafu,
    },
};

/// Number of columns in a position row.
pub const POSITION_ROW_LEN: usize = 10;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    #[serde(rename = "JWT", default)]
    pub jwt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PositionsForMmsisRequest {
    pub mmsi_ids: Vec<i32>,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PositionsWithinBboxRequest {
    pub bbox: String,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ShipForMmsisRequest {
    pub mmsi_ids: Vec<i32>,
}

/// Column layout of a position row:
/// `[mmsi, date_time_utc, longitude, latitude, COG, SOG, ais_msg_type, calc_speed,
///   sec_prevpoint, dist_prevpoint]`
#[derive(Debug, Deserialize)]
struct PositionRow(
    i64,
    String,
    f64,
    f64,
    Option<f64>,
    Option<f64>,
    Option<i32>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

/// Decodes one provider position row, validating its length and the type of every column.
pub fn decode_position_row(row: Value) -> Result<Position, RowError> {
    let len = match &row {
        Value::Array(items) => items.len(),
        other => {
            return NotArraySnafu {
                value: other.to_string(),
            }
            .fail();
        }
    };

    if len != POSITION_ROW_LEN {
        return AritySnafu { len }.fail();
    }

    let PositionRow(
        mmsi,
        timestamp,
        longitude,
        latitude,
        course_over_ground,
        speed_over_ground,
        ais_message_type,
        calculated_speed,
        seconds_since_previous,
        distance_since_previous,
    ) = serde_json::from_value(row).context(FieldSnafu)?;

    let mmsi = Mmsi::new_loose(mmsi).context(MmsiSnafu)?;
    let timestamp = parse_iso_timestamp(&timestamp).context(TimestampSnafu)?;

    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return CoordinatesSnafu {
            longitude,
            latitude,
        }
        .fail();
    }

    Ok(Position {
        mmsi,
        timestamp,
        longitude,
        latitude,
        course_over_ground,
        speed_over_ground,
        ais_message_type,
        calculated_speed,
        seconds_since_previous,
        distance_since_previous,
    })
}
