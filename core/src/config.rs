// ABOUTME: Explicit runtime configuration for the bridge and its adapters
// ABOUTME: Built once by the host and passed in; adapters never read ambient state

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Fixed delay between issuing the deeplink navigation and showing the
/// success fallback UI. A single delay, not a retry loop.
pub const DEFAULT_EJECT_GRACE: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid URL: {value:?}")]
    InvalidUrl { name: &'static str, value: String },
}

/// Immutable configuration for one bridge instance.
///
/// Constructed explicitly from the page context (or the environment for test
/// hosts) and handed into each adapter's constructor. Nothing in the flow
/// performs an ambient lookup.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Endpoint of the session exchange RPC.
    pub session_url: String,
    /// Endpoint of the hydration RPC.
    pub hydration_url: String,
    /// Optional shared secret forwarded to the hydration endpoint.
    pub api_secret: Option<String>,
    /// Grace delay before the ejecting state resolves to success.
    pub eject_grace: Duration,
}

impl BridgeConfig {
    pub fn new(
        session_url: impl Into<String>,
        hydration_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let session_url = validated_url("session_url", session_url.into())?;
        let hydration_url = validated_url("hydration_url", hydration_url.into())?;

        Ok(Self {
            session_url,
            hydration_url,
            api_secret: None,
            eject_grace: DEFAULT_EJECT_GRACE,
        })
    }

    pub fn with_api_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }

    pub fn with_eject_grace(mut self, grace: Duration) -> Self {
        self.eject_grace = grace;
        self
    }

    /// Read configuration from the environment.
    ///
    /// `ENOKI_SESSION_URL` and `ENOKI_HYDRATION_URL` are required;
    /// `ENOKI_API_SECRET` and `EJECT_GRACE_MS` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_url =
            env::var("ENOKI_SESSION_URL").map_err(|_| ConfigError::Missing("ENOKI_SESSION_URL"))?;
        let hydration_url = env::var("ENOKI_HYDRATION_URL")
            .map_err(|_| ConfigError::Missing("ENOKI_HYDRATION_URL"))?;

        let mut config = Self::new(session_url, hydration_url)?;

        if let Ok(secret) = env::var("ENOKI_API_SECRET") {
            config = config.with_api_secret(secret);
        }
        if let Some(ms) = env::var("EJECT_GRACE_MS").ok().and_then(|v| v.parse().ok()) {
            config = config.with_eject_grace(Duration::from_millis(ms));
        }

        Ok(config)
    }
}

fn validated_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    match Url::parse(&value) {
        Ok(_) => Ok(value),
        Err(_) => Err(ConfigError::InvalidUrl { name, value }),
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("session_url", &self.session_url)
            .field("hydration_url", &self.hydration_url)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<set>"))
            .field("eject_grace", &self.eject_grace)
            .finish()
    }
}
