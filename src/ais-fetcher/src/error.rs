use std::path::PathBuf;

use kystdata_core::DateRangeError;
use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to load settings"))]
    Config {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: config::ConfigError,
    },
    #[snafu(display("Failed to set up logging"))]
    Logging {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: tracing_subscriber::util::TryInitError,
    },
    #[snafu(display("Invalid base url '{url}'"))]
    BaseUrl {
        #[snafu(implicit)]
        location: Location,
        url: String,
        #[snafu(source)]
        error: url::ParseError,
    },
    #[snafu(display("Duration does not fit in a date range"))]
    Duration {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: chrono::OutOfRangeError,
    },
    #[snafu(display("Invalid date range"))]
    Range {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: DateRangeError,
    },
    #[snafu(display("{msg}"))]
    InvalidArgument {
        #[snafu(implicit)]
        location: Location,
        msg: String,
    },
    #[snafu(display("Failed to build http client"))]
    HttpClient {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: http_client::Error,
    },
    #[snafu(display("Kystdatahuset client error"))]
    Client {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: kystdatahuset_rs::Error,
    },
    #[snafu(display("Position fetch stopped at a failed window"))]
    Window {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: kystdatahuset_rs::WindowError,
    },
    #[snafu(display("Fetch worker failed"))]
    Worker {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: tokio::task::JoinError,
    },
    #[snafu(display("IO error on '{}'", path.display()))]
    Io {
        #[snafu(implicit)]
        location: Location,
        path: PathBuf,
        #[snafu(source)]
        error: std::io::Error,
    },
    #[snafu(display("Failed to encode json"))]
    Json {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: serde_json::Error,
    },
}
