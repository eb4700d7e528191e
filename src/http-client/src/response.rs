use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use snafu::ResultExt;

use crate::{
    Result,
    error::error::{BodySnafu, DecodeSnafu},
};

/// A response with a 2xx status.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
    url: Url,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response, url: Url) -> Self {
        Self { inner, url }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn text(self) -> Result<String> {
        self.inner.text().await.context(BodySnafu { url: self.url })
    }

    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.url.clone();
        let text = self.text().await?;
        serde_json::from_str(&text).context(DecodeSnafu { url })
    }
}
