use kystdata_core::{DateRangeError, FetchWindow, MmsiError, ParseTimestampError};
use snafu::{Location, Snafu};

use crate::Endpoint;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Request to '{endpoint}' failed"))]
    Transport {
        #[snafu(implicit)]
        location: Location,
        endpoint: Endpoint,
        #[snafu(source)]
        error: http_client::Error,
    },
    #[snafu(display("Kystdatahuset rejected the request to '{endpoint}': '{msg}'"))]
    Provider {
        #[snafu(implicit)]
        location: Location,
        endpoint: Endpoint,
        msg: String,
    },
    #[snafu(display("The kystdatahuset request to '{endpoint}' timed out on their end: '{msg}'"))]
    ProviderTimeout {
        #[snafu(implicit)]
        location: Location,
        endpoint: Endpoint,
        msg: String,
    },
    #[snafu(display("Kystdatahuset returned no data for '{endpoint}'"))]
    EmptyResult {
        #[snafu(implicit)]
        location: Location,
        endpoint: Endpoint,
    },
    #[snafu(display("Received a malformed response envelope from '{endpoint}'"))]
    MalformedEnvelope {
        #[snafu(implicit)]
        location: Location,
        endpoint: Endpoint,
        #[snafu(source)]
        error: serde_json::Error,
    },
    #[snafu(display("Not logged in to kystdatahuset"))]
    NotAuthenticated {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Username and password are required to log in"))]
    MissingCredentials {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Login succeeded but no token was returned"))]
    MissingToken {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Login returned a token that cannot be sent as a bearer token"))]
    InvalidToken {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Invalid url for '{endpoint}'"))]
    Url {
        #[snafu(implicit)]
        location: Location,
        endpoint: Endpoint,
        #[snafu(source)]
        error: url::ParseError,
    },
    #[snafu(display("Invalid fetch window"))]
    InvalidWindow {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: DateRangeError,
    },
}

/// A failed window of a multi-window fetch. Carries the window so just that window can be
/// retried.
#[derive(Debug, Snafu)]
#[snafu(display("Failed to fetch window {window}"), visibility(pub(crate)))]
pub struct WindowError {
    #[snafu(implicit)]
    location: Location,
    window: FetchWindow,
    #[snafu(source)]
    error: Error,
}

/// Why a single position row was rejected. Rows are skipped, never fatal.
#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum RowError {
    #[snafu(display("Expected a position array, got '{value}'"))]
    NotArray { value: String },
    #[snafu(display("Expected a position array of 10 elements, got {len}"))]
    Arity { len: usize },
    #[snafu(display("Position row has a field of the wrong type"))]
    Field {
        #[snafu(source)]
        error: serde_json::Error,
    },
    #[snafu(display("Position row has an invalid MMSI"))]
    Mmsi {
        #[snafu(source)]
        error: MmsiError,
    },
    #[snafu(display("Position row has an invalid timestamp"))]
    Timestamp {
        #[snafu(source)]
        error: ParseTimestampError,
    },
    #[snafu(display("Position row has coordinates out of range, lon: '{longitude}', lat: '{latitude}'"))]
    Coordinates { longitude: f64, latitude: f64 },
}

impl Error {
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Error::Transport { endpoint, .. }
            | Error::Provider { endpoint, .. }
            | Error::ProviderTimeout { endpoint, .. }
            | Error::EmptyResult { endpoint, .. }
            | Error::MalformedEnvelope { endpoint, .. }
            | Error::Url { endpoint, .. } => Some(*endpoint),
            Error::NotAuthenticated { .. }
            | Error::MissingCredentials { .. }
            | Error::MissingToken { .. }
            | Error::InvalidToken { .. }
            | Error::InvalidWindow { .. } => None,
        }
    }

    /// Whether repeating the same request may succeed: provider timeouts, connection
    /// failures and server errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ProviderTimeout { .. } => true,
            Error::Transport { error, .. } => match error {
                http_client::Error::InvalidHeader { .. } => false,
                error => error.is_timeout() || error.status().is_none_or(|s| s.is_server_error()),
            },
            _ => false,
        }
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, Error::EmptyResult { .. })
    }

    /// The provider's message, for errors that carry one.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Error::Provider { msg, .. } | Error::ProviderTimeout { msg, .. } => Some(msg),
            _ => None,
        }
    }
}

impl WindowError {
    pub fn window(&self) -> &FetchWindow {
        &self.window
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn into_error(self) -> Error {
        self.error
    }
}
