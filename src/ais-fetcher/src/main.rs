#![deny(warnings)]
#![deny(rust_2018_idioms)]

use std::process::ExitCode;

use ais_fetcher::{cli::Args, logging::init_tracing, settings::Settings};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::new() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e:?}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(settings.log_level) {
        eprintln!("{e:?}");
        return ExitCode::FAILURE;
    }

    match ais_fetcher::run(args, settings).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
