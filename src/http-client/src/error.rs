use reqwest::{
    StatusCode, Url,
    header::{HeaderName, InvalidHeaderValue},
};
use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to build the http client"))]
    Build {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: reqwest::Error,
    },
    #[snafu(display("Invalid value for header '{name}'"))]
    InvalidHeader {
        #[snafu(implicit)]
        location: Location,
        name: HeaderName,
        #[snafu(source)]
        error: InvalidHeaderValue,
    },
    #[snafu(display("Failed to send request to '{url}'"))]
    Send {
        #[snafu(implicit)]
        location: Location,
        url: Url,
        #[snafu(source)]
        error: reqwest_middleware::Error,
    },
    #[snafu(display("Failed to read response body from '{url}'"))]
    Body {
        #[snafu(implicit)]
        location: Location,
        url: Url,
        #[snafu(source)]
        error: reqwest::Error,
    },
    #[snafu(display("Response from '{url}' was not valid json"))]
    Decode {
        #[snafu(implicit)]
        location: Location,
        url: Url,
        #[snafu(source)]
        error: serde_json::Error,
    },
    #[snafu(display("'{url}' responded with status '{status}', body: '{body}'"))]
    Status {
        #[snafu(implicit)]
        location: Location,
        url: Url,
        status: StatusCode,
        body: String,
    },
}

impl Error {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Send { error, .. } => error.status(),
            Error::Build { .. }
            | Error::InvalidHeader { .. }
            | Error::Body { .. }
            | Error::Decode { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Send { error, .. } => error.is_timeout(),
            Error::Body { error, .. } => error.is_timeout(),
            Error::Status { status, .. } => {
                matches!(*status, StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT)
            }
            Error::Build { .. } | Error::InvalidHeader { .. } | Error::Decode { .. } => false,
        }
    }
}
