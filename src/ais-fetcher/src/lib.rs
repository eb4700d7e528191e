#![deny(warnings)]
#![deny(rust_2018_idioms)]

use std::{path::Path, sync::Arc};

use kystdata_core::{Clock, CredentialStore, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub mod cli;
pub mod error;
pub mod layers;
pub mod logging;
pub mod progress;
pub mod settings;
pub mod startup;
pub mod store;

pub use error::{Error, Result};

use crate::{
    cli::Args, layers::MemoryLayers, progress::IndicatifProgress, settings::Settings,
    startup::{App, FetchSummary}, store::SettingsCredentialStore,
};

/// Runs one fetch from the command line: logs in, fetches into in-memory layers and exports
/// them. Ctrl-C cancels the fetch; layers filled so far are still exported.
pub async fn run(args: Args, settings: Settings) -> Result<FetchSummary> {
    let store = Arc::new(SettingsCredentialStore::from_settings(&settings));

    let request = args.resolve(
        SystemClock.now(),
        settings.fetch.default_range()?,
        store.last_mmsi(),
    )?;

    let app = App::build(&settings, store).await?;

    let cancellation = CancellationToken::new();
    tokio::spawn({
        let cancellation = cancellation.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("received ctrl-c, cancelling fetch");
                cancellation.cancel();
            }
        }
    });

    let mut layers = MemoryLayers::new();
    let progress = IndicatifProgress::new();

    let result = app
        .fetch(&request, &mut layers, &progress, cancellation)
        .await;

    match &settings.output_dir {
        Some(dir) => export_layers(&layers, dir, result),
        None => result,
    }
}

/// Exports whatever `layers` holds. A failed fetch keeps its own error even when the export
/// fails too.
fn export_layers(
    layers: &MemoryLayers,
    dir: &Path,
    result: Result<FetchSummary>,
) -> Result<FetchSummary> {
    match layers.export_geojson(dir) {
        Ok(paths) => {
            info!("exported {} layers to {}", paths.len(), dir.display());
            result
        }
        Err(e) if result.is_err() => {
            error!("failed to export layers to {}: {e:?}", dir.display());
            result
        }
        Err(e) => Err(e),
    }
}
