use std::sync::Arc;

use chrono::{DateTime, Utc};
use http_client::{HttpClient, Url};
use kystdata_core::{Clock, CredentialStore, Mmsi, ShipInfo, SystemClock};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use snafu::ResultExt;
use tracing::{info, instrument};

use crate::{
    Endpoint, Result,
    envelope::Envelope,
    error::error::{
        InvalidTokenSnafu, MissingCredentialsSnafu, MissingTokenSnafu, NotAuthenticatedSnafu,
        TransportSnafu, UrlSnafu,
    },
    models::{LoginData, LoginRequest, ShipForMmsisRequest},
};

pub const DEFAULT_BASE_URL: &str = "https://kystdatahuset.no/ws/";

/// Bearer token handed out by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

/// An authenticated session. Tokens are never refreshed.
#[derive(Debug, Clone)]
pub struct Session {
    token: BearerToken,
    username: String,
    acquired_at: DateTime<Utc>,
}

/// Client context for the Kystdatahuset API. Holds the session and the clock; every call
/// goes through an explicit instance, there is no shared global state.
pub struct KystdatahusetClient {
    http: HttpClient,
    base_url: Url,
    session: Option<Session>,
    clock: Arc<dyn Clock>,
}

impl KystdatahusetClient {
    pub fn new(http: HttpClient, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            http,
            base_url,
            session: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Logs in and stores the session. On failure the client is left unauthenticated.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Session> {
        self.session = None;

        if username.is_empty() || password.is_empty() {
            return MissingCredentialsSnafu.fail();
        }

        let body = LoginRequest { username, password };
        let data: LoginData = self.post(Endpoint::Login, &body, None).await?;

        let token = data
            .jwt
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MissingTokenSnafu.build())?;

        if !token.bytes().all(|b| b.is_ascii_graphic()) {
            return InvalidTokenSnafu.fail();
        }

        let token = BearerToken(token);
        info!("logged in successfully with token: {token:?}");

        Ok(self.session.insert(Session {
            token,
            username: username.to_string(),
            acquired_at: self.clock.now(),
        }))
    }

    /// Logs in with the stored credentials unless a session already exists.
    pub async fn ensure_session(&mut self, store: &dyn CredentialStore) -> Result<&Session> {
        if self.session.is_none() {
            let creds = store
                .credentials()
                .ok_or_else(|| MissingCredentialsSnafu.build())?;
            self.login(&creds.username, &creds.password).await?;
        }

        self.session
            .as_ref()
            .ok_or_else(|| NotAuthenticatedSnafu.build())
    }

    /// Looks up ship metadata. The provider may return several matches, the first one is used.
    /// `Ok(None)` means the vessel is unknown to the provider.
    #[instrument(skip(self))]
    pub async fn lookup(&self, mmsi: Mmsi) -> Result<Option<ShipInfo>> {
        let body = ShipForMmsisRequest {
            mmsi_ids: vec![mmsi.into_inner()],
        };

        let ships: Vec<ShipInfo> = self
            .post(Endpoint::ShipForMmsis, &body, Some(self.token()?))
            .await?;

        let ship = ships.into_iter().next();
        match &ship {
            Some(s) => info!("found ship: {}", s.display_name()),
            None => info!("no ship found for mmsi {mmsi}"),
        }

        Ok(ship)
    }

    pub(crate) fn token(&self) -> Result<&BearerToken> {
        self.session
            .as_ref()
            .map(|s| &s.token)
            .ok_or_else(|| NotAuthenticatedSnafu.build())
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &impl Serialize,
        token: Option<&BearerToken>,
    ) -> Result<T> {
        self.post_envelope(endpoint, body, token)
            .await?
            .into_typed(endpoint)
    }

    pub(crate) async fn post_raw(
        &self,
        endpoint: Endpoint,
        body: &impl Serialize,
        token: Option<&BearerToken>,
    ) -> Result<Value> {
        self.post_envelope(endpoint, body, token)
            .await?
            .into_data(endpoint)
    }

    async fn post_envelope(
        &self,
        endpoint: Endpoint,
        body: &impl Serialize,
        token: Option<&BearerToken>,
    ) -> Result<Envelope> {
        let url = self
            .base_url
            .join(endpoint.path())
            .context(UrlSnafu { endpoint })?;

        let mut req = self.http.post(url).accept_json().json(body);
        if let Some(token) = token {
            req = req
                .bearer_auth(token.as_ref())
                .context(TransportSnafu { endpoint })?;
        }

        let body = req
            .send()
            .await
            .context(TransportSnafu { endpoint })?
            .text()
            .await
            .context(TransportSnafu { endpoint })?;

        Envelope::parse(endpoint, &body)
    }
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>, acquired_at: DateTime<Utc>) -> Self {
        Self {
            token: BearerToken(token.into()),
            username: username.into(),
            acquired_at,
        }
    }

    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

impl AsRef<str> for BearerToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(10).collect();
        write!(f, "{prefix}...")
    }
}
