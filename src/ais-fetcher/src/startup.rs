use std::{collections::HashMap, sync::Arc};

use futures::StreamExt;
use http_client::{HttpClient, Url};
use kystdata_core::{
    CredentialStore, DateRange, LayerId, LayerSink, Mmsi, Position, ProgressReporter, ShipInfo,
};
use kystdatahuset_rs::{
    EmptyResultPolicy, FetchOptions, KystdatahusetClient, PositionBatch, PositionQuery,
};
use snafu::ResultExt;
use tokio::sync::mpsc::channel;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{
    Result,
    error::error::{BaseUrlSnafu, ClientSnafu, HttpClientSnafu, RangeSnafu, WindowSnafu, WorkerSnafu},
    settings::Settings,
};

/// What to fetch: a vessel or an area, over a time range.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub query: PositionQuery,
    pub range: DateRange,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchSummary {
    pub total_windows: usize,
    pub windows: usize,
    pub positions: usize,
    pub skipped: usize,
    pub empty_windows: usize,
    pub cancelled: bool,
    pub layers: Vec<LayerId>,
}

/// A logged-in client together with the host's credential store.
pub struct App {
    client: Arc<KystdatahusetClient>,
    store: Arc<dyn CredentialStore>,
    options: FetchOptions,
}

impl App {
    /// Builds the http client and logs in with the stored credentials.
    pub async fn build(settings: &Settings, store: Arc<dyn CredentialStore>) -> Result<App> {
        let http = HttpClient::builder()
            .timeout(settings.api.request_timeout)
            .max_retries(settings.api.max_retries)
            .build()
            .context(HttpClientSnafu)?;

        let base_url = Url::parse(&settings.api.base_url).context(BaseUrlSnafu {
            url: &settings.api.base_url,
        })?;

        let mut client = KystdatahusetClient::new(http, base_url);
        client
            .ensure_session(store.as_ref())
            .await
            .context(ClientSnafu)?;

        Ok(App {
            client: Arc::new(client),
            store,
            options: settings.fetch.options()?,
        })
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Fetches the request window by window on a background task and applies each batch to
    /// `sink` as it arrives. Layers filled before a failed window are kept. Once `cancellation`
    /// fires no further batch is applied.
    #[instrument(skip_all, fields(app.query = ?request.query))]
    pub async fn fetch(
        &self,
        request: &FetchRequest,
        sink: &mut dyn LayerSink,
        progress: &dyn ProgressReporter,
        cancellation: CancellationToken,
    ) -> Result<FetchSummary> {
        let total_windows = request
            .range
            .windows(self.options.max_window)
            .context(RangeSnafu)?
            .count();

        let mut summary = FetchSummary {
            total_windows,
            ..Default::default()
        };

        if cancellation.is_cancelled() {
            summary.cancelled = true;
            return Ok(summary);
        }

        let mut ships = HashMap::new();

        let message = match &request.query {
            PositionQuery::Vessel(mmsi) => {
                if let Err(e) = self.store.set_last_mmsi(*mmsi) {
                    warn!("failed to remember mmsi {mmsi}: {e:?}");
                }

                let ship = match self.client.lookup(*mmsi).await {
                    Ok(Some(ship)) => ship,
                    Ok(None) => {
                        warn!("no ship metadata found for mmsi {mmsi}");
                        ShipInfo::default()
                    }
                    Err(e)
                        if e.is_empty_result()
                            && self.options.empty_result_policy == EmptyResultPolicy::Skip =>
                    {
                        warn!("ship lookup for mmsi {mmsi} returned no data");
                        ShipInfo::default()
                    }
                    Err(e) => {
                        progress.report_error(&format!("Error looking up mmsi {mmsi}: {e}"));
                        return Err(e).context(ClientSnafu);
                    }
                };

                let message = format!(
                    "Gathering AIS positions for MMSI {mmsi} / {}",
                    ship.display_name()
                );
                summary.layers.push(sink.ensure_layer(*mmsi, &ship));
                ships.insert(*mmsi, ship);
                message
            }
            PositionQuery::Area(bbox) => format!("Gathering AIS positions within {bbox}"),
        };

        info!("{message}, {total_windows} windows");
        progress.start(total_windows as u64, &message);

        let options = FetchOptions {
            cancellation: Some(cancellation.clone()),
            ..self.options.clone()
        };

        let (tx, mut rx) = channel(1);

        let handle = tokio::spawn({
            let client = self.client.clone();
            let query = request.query.clone();
            let range = request.range;
            async move {
                let stream = client.windowed_positions(query, range, options)?;
                let mut stream = std::pin::pin!(stream);
                while let Some(item) = stream.next().await {
                    if tx.send(item).await.is_err() {
                        break;
                    }
                }
                Ok::<_, kystdatahuset_rs::Error>(())
            }
        });

        let mut failure = None;
        while let Some(item) = rx.recv().await {
            if cancellation.is_cancelled() {
                break;
            }

            match item {
                Ok(batch) => apply_batch(batch, sink, &mut ships, &mut summary, progress),
                Err(e) => {
                    progress.report_error(&format!(
                        "Error querying AIS positions for {}: {}",
                        e.window(),
                        e.error()
                    ));
                    failure = Some(e);
                }
            }
        }
        drop(rx);

        handle
            .await
            .context(WorkerSnafu)?
            .context(ClientSnafu)?;

        if let Some(e) = failure {
            return Err(e).context(WindowSnafu);
        }

        if cancellation.is_cancelled() {
            summary.cancelled = true;
            progress.finish("Cancelled");
            info!("fetch cancelled after {} windows", summary.windows);
        } else {
            progress.finish(&format!("Added {} positions", summary.positions));
            info!(
                "fetched {} positions in {} windows, skipped {} malformed rows",
                summary.positions, summary.windows, summary.skipped
            );
        }

        Ok(summary)
    }
}

fn apply_batch(
    batch: PositionBatch,
    sink: &mut dyn LayerSink,
    ships: &mut HashMap<Mmsi, ShipInfo>,
    summary: &mut FetchSummary,
    progress: &dyn ProgressReporter,
) {
    let PositionBatch {
        window,
        positions,
        skipped,
        empty,
    } = batch;

    let num_positions = positions.len();

    let mut by_vessel: Vec<(Mmsi, Vec<Position>)> = Vec::new();
    for p in positions {
        match by_vessel.iter_mut().find(|(m, _)| *m == p.mmsi) {
            Some((_, v)) => v.push(p),
            None => by_vessel.push((p.mmsi, vec![p])),
        }
    }

    for (mmsi, positions) in by_vessel {
        let ship = ships.entry(mmsi).or_default();
        let layer = sink.ensure_layer(mmsi, ship);
        if !summary.layers.contains(&layer) {
            summary.layers.push(layer);
        }
        sink.add_positions(layer, &positions);
    }

    summary.windows += 1;
    summary.positions += num_positions;
    summary.skipped += skipped;
    if empty {
        summary.empty_windows += 1;
    }

    progress.window_done(&window, num_positions);
}
