use chrono::{DateTime, Utc};

use crate::{CoreResult, FetchWindow, LayerId, Mmsi, Position, ShipInfo};

/// Username/password pair for the provider's login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Settings store owned by the host: stored credentials and the last vessel queried.
pub trait CredentialStore: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
    fn last_mmsi(&self) -> Option<Mmsi>;
    fn set_last_mmsi(&self, mmsi: Mmsi) -> CoreResult<()>;
}

/// Receives decoded positions for display. One layer per vessel.
pub trait LayerSink: Send {
    /// Returns the layer tagged with `mmsi`, creating it with `info` attached if none exists.
    fn ensure_layer(&mut self, mmsi: Mmsi, info: &ShipInfo) -> LayerId;
    fn add_positions(&mut self, layer: LayerId, positions: &[Position]);
}

pub trait ProgressReporter: Send + Sync {
    fn start(&self, total_windows: u64, message: &str);
    fn window_done(&self, window: &FetchWindow, num_positions: usize);
    fn finish(&self, message: &str);
    fn report_error(&self, message: &str);
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(any(test, feature = "test"))]
mod test {
    use super::*;

    /// Clock frozen at a fixed instant.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock(pub DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }
}

#[cfg(any(test, feature = "test"))]
pub use test::FixedClock;
