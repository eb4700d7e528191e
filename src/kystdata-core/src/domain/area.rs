use std::{fmt::Display, str::FromStr};

use geo::{Coord, Point, Rect};

use crate::{BoundingBoxError, bounding_box_error::InvalidSnafu};

/// Longitude/latitude rectangle in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox(Rect<f64>);

impl BoundingBox {
    pub fn new(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Self, BoundingBoxError> {
        let lon_ok = (-180.0..=180.0).contains(&min_lon)
            && (-180.0..=180.0).contains(&max_lon)
            && min_lon < max_lon;
        let lat_ok = (-90.0..=90.0).contains(&min_lat)
            && (-90.0..=90.0).contains(&max_lat)
            && min_lat < max_lat;

        if !(lon_ok && lat_ok) {
            return InvalidSnafu {
                min_lon,
                min_lat,
                max_lon,
                max_lat,
            }
            .fail();
        }

        Ok(Self(Rect::new(
            Coord {
                x: min_lon,
                y: min_lat,
            },
            Coord {
                x: max_lon,
                y: max_lat,
            },
        )))
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        let (min, max) = (self.0.min(), self.0.max());
        point.x() >= min.x && point.x() <= max.x && point.y() >= min.y && point.y() <= max.y
    }
}

/// Formats as `minLon,minLat,maxLon,maxLat`, the form the provider expects.
impl Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (min, max) = (self.0.min(), self.0.max());
        write!(f, "{},{},{},{}", min.x, min.y, max.x, max.y)
    }
}

impl FromStr for BoundingBox {
    type Err = BoundingBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_default();

        match values.as_slice() {
            [min_lon, min_lat, max_lon, max_lat] => {
                Self::new(*min_lon, *min_lat, *max_lon, *max_lat)
            }
            _ => InvalidSnafu {
                min_lon: f64::NAN,
                min_lat: f64::NAN,
                max_lon: f64::NAN,
                max_lat: f64::NAN,
            }
            .fail(),
        }
    }
}
