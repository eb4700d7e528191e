use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use snafu::ResultExt;

use crate::{
    Endpoint, Result,
    error::error::{EmptyResultSnafu, MalformedEnvelopeSnafu, ProviderSnafu, ProviderTimeoutSnafu},
};

/// Marker the provider puts in `msg` when its own backend timed out.
pub(crate) const PROVIDER_TIMEOUT_MARKER: &str = "The operation has timed out.";

/// The `{success, msg, data}` wrapper every endpoint responds with.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    success: bool,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl Envelope {
    pub(crate) fn parse(endpoint: Endpoint, body: &str) -> Result<Envelope> {
        serde_json::from_str(body).context(MalformedEnvelopeSnafu { endpoint })
    }

    /// Applies the provider's error conventions and returns the raw `data` value.
    pub(crate) fn into_data(self, endpoint: Endpoint) -> Result<Value> {
        let Envelope { success, msg, data } = self;

        if let Some(msg) = msg.as_deref().filter(|m| m.contains(PROVIDER_TIMEOUT_MARKER)) {
            return ProviderTimeoutSnafu { endpoint, msg }.fail();
        }

        if !success {
            return ProviderSnafu {
                endpoint,
                msg: msg.unwrap_or_default(),
            }
            .fail();
        }

        match data {
            None | Some(Value::Null) => EmptyResultSnafu { endpoint }.fail(),
            Some(data) => Ok(data),
        }
    }

    pub(crate) fn into_typed<T: DeserializeOwned>(self, endpoint: Endpoint) -> Result<T> {
        let data = self.into_data(endpoint)?;
        serde_json::from_value(data).context(MalformedEnvelopeSnafu { endpoint })
    }
}
