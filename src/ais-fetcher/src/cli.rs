use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use kystdata_core::{BoundingBox, DateRange, Mmsi, parse_timestamp};
use kystdatahuset_rs::PositionQuery;
use snafu::ResultExt;

use crate::{
    Result,
    error::error::{InvalidArgumentSnafu, RangeSnafu},
    startup::FetchRequest,
};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Fetches AIS positions from Kystdatahuset into map layers")]
pub struct Args {
    /// Vessel to fetch. Defaults to the last vessel fetched.
    #[arg(long, conflicts_with = "bbox")]
    pub mmsi: Option<Mmsi>,
    /// Fetch every vessel inside `minLon,minLat,maxLon,maxLat` instead of a single vessel.
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<BoundingBox>,
    /// Start of the range, RFC 3339 or `YYYYMMDDHHmm`.
    #[arg(long, value_parser = parse_time)]
    pub start: Option<DateTime<Utc>>,
    /// End of the range, RFC 3339 or `YYYYMMDDHHmm`. Defaults to now.
    #[arg(long, value_parser = parse_time)]
    pub end: Option<DateTime<Utc>>,
    /// Length of the range in days when no start is given.
    #[arg(long, conflicts_with = "start")]
    pub days: Option<u32>,
}

impl Args {
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        default_range: Duration,
        last_mmsi: Option<Mmsi>,
    ) -> Result<FetchRequest> {
        let query = match (self.bbox, self.mmsi.or(last_mmsi)) {
            (Some(bbox), _) => PositionQuery::Area(bbox),
            (None, Some(mmsi)) => PositionQuery::Vessel(mmsi),
            (None, None) => {
                return InvalidArgumentSnafu {
                    msg: "no --mmsi given and no previously fetched vessel to fall back to",
                }
                .fail();
            }
        };

        let end = self.end.unwrap_or(now);
        let range = match (self.start, self.days) {
            (Some(start), _) => DateRange::new(start, end),
            (None, Some(days)) => DateRange::ending_at(end, Duration::days(days.into())),
            (None, None) => DateRange::ending_at(end, default_range),
        }
        .context(RangeSnafu)?;

        Ok(FetchRequest { query, range })
    }
}

fn parse_time(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(value).map_err(|e| e.to_string())
}
