use reqwest::{
    Url,
    header::{ACCEPT, AUTHORIZATION, HeaderName, HeaderValue},
};
use serde::Serialize;
use snafu::ResultExt;

use crate::{
    Response, Result,
    error::error::{BodySnafu, InvalidHeaderSnafu, SendSnafu, StatusSnafu},
};

/// Longest error body kept on a [`crate::Error::Status`].
const MAX_ERROR_BODY_LEN: usize = 1024;

#[derive(Debug)]
pub struct RequestBuilder {
    inner: reqwest_middleware::RequestBuilder,
    url: Url,
}

impl RequestBuilder {
    pub(crate) fn new(inner: reqwest_middleware::RequestBuilder, url: Url) -> Self {
        Self { inner, url }
    }

    /// Serializes `body` as the request body, with `Content-Type: application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.inner = self.inner.json(body);
        self
    }

    pub fn accept_json(self) -> Self {
        self.header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Sets `Authorization: Bearer <token>`, marked sensitive so it stays out of debug output.
    pub fn bearer_auth(self, token: &str) -> Result<Self> {
        let mut value =
            HeaderValue::try_from(format!("Bearer {token}")).context(InvalidHeaderSnafu {
                name: AUTHORIZATION,
            })?;
        value.set_sensitive(true);
        Ok(self.header(AUTHORIZATION, value))
    }

    pub fn header(mut self, key: HeaderName, value: HeaderValue) -> Self {
        self.inner = self.inner.header(key, value);
        self
    }

    /// Sends the request. Any status outside 2xx is returned as [`crate::Error::Status`].
    pub async fn send(self) -> Result<Response> {
        let Self { inner, url } = self;

        let response = inner.send().await.context(SendSnafu { url: url.clone() })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.context(BodySnafu { url: url.clone() })?;
            truncate(&mut body, MAX_ERROR_BODY_LEN);
            return StatusSnafu { url, status, body }.fail();
        }

        Ok(Response::new(response, url))
    }
}

fn truncate(body: &mut String, max_len: usize) {
    if body.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
}
