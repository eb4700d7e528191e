use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use kystdata_core::{CoreResult, CredentialStore, Credentials, Mmsi, core_error::UnexpectedSnafu};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tracing::warn;

use crate::{
    Result,
    error::error::{IoSnafu, JsonSnafu},
    settings::Settings,
};

/// Credentials from settings, plus the last used MMSI persisted as a small json file.
pub struct SettingsCredentialStore {
    credentials: Option<Credentials>,
    state_file: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    last_mmsi: Option<Mmsi>,
}

impl SettingsCredentialStore {
    pub fn new(credentials: Option<Credentials>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            credentials,
            state_file: state_file.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.credentials(), &settings.state_file)
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    fn read_state(&self) -> Result<State> {
        match std::fs::read(&self.state_file) {
            Ok(bytes) => serde_json::from_slice(&bytes).context(JsonSnafu),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(State::default()),
            Err(e) => Err(e).context(IoSnafu {
                path: &self.state_file,
            }),
        }
    }

    fn write_state(&self, state: &State) -> Result<()> {
        if let Some(parent) = self.state_file.parent() {
            std::fs::create_dir_all(parent).context(IoSnafu { path: parent })?;
        }

        let bytes = serde_json::to_vec_pretty(state).context(JsonSnafu)?;
        std::fs::write(&self.state_file, bytes).context(IoSnafu {
            path: &self.state_file,
        })
    }
}

impl CredentialStore for SettingsCredentialStore {
    fn credentials(&self) -> Option<Credentials> {
        self.credentials.clone().filter(|c| c.is_complete())
    }

    fn last_mmsi(&self) -> Option<Mmsi> {
        match self.read_state() {
            Ok(state) => state.last_mmsi,
            Err(e) => {
                warn!("failed to read state file: {e:?}");
                None
            }
        }
    }

    fn set_last_mmsi(&self, mmsi: Mmsi) -> CoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut state = self.read_state().unwrap_or_default();
        state.last_mmsi = Some(mmsi);

        self.write_state(&state)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
            .context(UnexpectedSnafu)
    }
}
