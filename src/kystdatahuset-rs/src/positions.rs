use chrono::Duration;
use futures::{Stream, stream};
use kystdata_core::{
    BoundingBox, DateRange, FetchWindow, Mmsi, Position, default_max_window,
};
use serde::Deserialize;
use serde_json::Value;
use snafu::{IntoError, ResultExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{
    Endpoint, KystdatahusetClient, Result, WindowError,
    error::{
        WindowSnafu,
        error::{InvalidWindowSnafu, MalformedEnvelopeSnafu},
    },
    models::{PositionsForMmsisRequest, PositionsWithinBboxRequest, decode_position_row},
};

/// What to do when the provider answers a window with `data: null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Yield an empty batch flagged as `empty` and continue with the next window.
    #[default]
    Skip,
    /// Yield the error and end the fetch.
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionQuery {
    Vessel(Mmsi),
    Area(BoundingBox),
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_window: Duration,
    pub empty_result_policy: EmptyResultPolicy,
    pub min_speed: Option<f64>,
    /// Checked before every window and raced against the in-flight request.
    pub cancellation: Option<CancellationToken>,
}

/// Decoded positions of one window.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionBatch {
    pub window: FetchWindow,
    pub positions: Vec<Position>,
    /// Rows that failed to decode and were left out.
    pub skipped: usize,
    /// The provider returned no data at all for this window.
    pub empty: bool,
}

struct StreamState<'a> {
    client: &'a KystdatahusetClient,
    query: PositionQuery,
    options: FetchOptions,
    windows: kystdata_core::Windows,
    done: bool,
}

impl KystdatahusetClient {
    /// Positions of one vessel over `range`, one batch per window, in chronological order.
    pub fn positions(
        &self,
        mmsi: Mmsi,
        range: DateRange,
        options: FetchOptions,
    ) -> Result<impl Stream<Item = std::result::Result<PositionBatch, WindowError>> + Send + '_>
    {
        self.windowed_positions(PositionQuery::Vessel(mmsi), range, options)
    }

    /// Positions of all vessels inside `bbox` over `range`, one batch per window.
    pub fn positions_in_area(
        &self,
        bbox: BoundingBox,
        range: DateRange,
        options: FetchOptions,
    ) -> Result<impl Stream<Item = std::result::Result<PositionBatch, WindowError>> + Send + '_>
    {
        self.windowed_positions(PositionQuery::Area(bbox), range, options)
    }

    /// Walks `range` window by window, issuing one request at a time. The stream ends after
    /// the last window, after the first failed window, or when the cancellation token fires.
    /// A cancelled window yields nothing.
    pub fn windowed_positions(
        &self,
        query: PositionQuery,
        range: DateRange,
        options: FetchOptions,
    ) -> Result<impl Stream<Item = std::result::Result<PositionBatch, WindowError>> + Send + '_>
    {
        self.token()?;
        let windows = range
            .windows(options.max_window)
            .context(InvalidWindowSnafu)?;

        let state = StreamState {
            client: self,
            query,
            options,
            windows,
            done: false,
        };

        Ok(stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }

            let window = state.windows.next()?;

            let result = match state.options.cancellation.clone() {
                Some(token) => {
                    if token.is_cancelled() {
                        info!("fetch cancelled before window {window}");
                        return None;
                    }
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            info!("fetch cancelled during window {window}");
                            return None;
                        }
                        r = state.client.fetch_window(&state.query, window, state.options.min_speed) => r,
                    }
                }
                None => {
                    state
                        .client
                        .fetch_window(&state.query, window, state.options.min_speed)
                        .await
                }
            };

            let item = match result {
                Ok(batch) => Ok(batch),
                Err(e)
                    if e.is_empty_result()
                        && state.options.empty_result_policy == EmptyResultPolicy::Skip =>
                {
                    warn!("no data for window {window}, continuing");
                    Ok(PositionBatch::empty(window))
                }
                Err(e) => {
                    state.done = true;
                    Err(WindowSnafu { window }.into_error(e))
                }
            };

            Some((item, state))
        }))
    }

    /// Fetches and decodes a single window. Malformed rows are skipped and counted.
    #[instrument(skip(self), fields(app.window = %window))]
    pub async fn fetch_window(
        &self,
        query: &PositionQuery,
        window: FetchWindow,
        min_speed: Option<f64>,
    ) -> Result<PositionBatch> {
        let token = self.token()?;

        let (endpoint, data) = match query {
            PositionQuery::Vessel(mmsi) => {
                let body = PositionsForMmsisRequest {
                    mmsi_ids: vec![mmsi.into_inner()],
                    start: window.provider_start(),
                    end: window.provider_end(),
                    min_speed,
                };
                let endpoint = Endpoint::PositionsForMmsis;
                (endpoint, self.post_raw(endpoint, &body, Some(token)).await?)
            }
            PositionQuery::Area(bbox) => {
                let body = PositionsWithinBboxRequest {
                    bbox: bbox.to_string(),
                    start: window.provider_start(),
                    end: window.provider_end(),
                    min_speed,
                };
                let endpoint = Endpoint::PositionsWithinBbox;
                (endpoint, self.post_raw(endpoint, &body, Some(token)).await?)
            }
        };

        let rows: Vec<Value> =
            serde_json::from_value(data).context(MalformedEnvelopeSnafu { endpoint })?;

        let num_rows = rows.len();
        let mut skipped = 0;
        let positions = rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| match decode_position_row(row) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("skipping malformed position row {i}: {e}");
                    skipped += 1;
                    None
                }
            })
            .collect::<Vec<_>>();

        info!(
            "received {} positions for window {window}, skipped {skipped} of {num_rows} rows",
            positions.len()
        );

        Ok(PositionBatch {
            window,
            positions,
            skipped,
            empty: false,
        })
    }
}

impl PositionBatch {
    pub fn empty(window: FetchWindow) -> Self {
        Self {
            window,
            positions: Vec::new(),
            skipped: 0,
            empty: true,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_window: default_max_window(),
            empty_result_policy: EmptyResultPolicy::default(),
            min_speed: None,
            cancellation: None,
        }
    }
}
