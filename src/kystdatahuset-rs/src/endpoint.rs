/// Endpoints of the Kystdatahuset API used by this client, relative to the API base url.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
pub enum Endpoint {
    #[strum(serialize = "login")]
    Login,
    #[strum(serialize = "positions_for_mmsis")]
    PositionsForMmsis,
    #[strum(serialize = "positions_within_bbox")]
    PositionsWithinBbox,
    #[strum(serialize = "ship_for_mmsis")]
    ShipForMmsis,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        use Endpoint::*;

        match self {
            Login => "api/auth/login",
            PositionsForMmsis => "api/ais/positions/for-mmsis-time",
            PositionsWithinBbox => "api/ais/positions/within-bbox-time",
            ShipForMmsis => "api/ship/for-mmsis",
        }
    }
}
