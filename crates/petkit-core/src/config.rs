// ── Client configuration ──
//
// Runtime settings for a `PetkitClient`. Built by the CLI from a config
// profile or directly by library consumers; never touches disk.

use std::time::Duration;

use secrecy::SecretString;

use petkit_api::auth::{DOMESTIC_GATEWAY, PASSPORT_URL};
use petkit_api::{Credentials, Endpoints, RetryPolicy, TransportConfig};

use crate::error::CoreError;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "US";

/// Everything needed to construct a `PetkitClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub username: String,
    pub password: SecretString,
    /// Country/region name or id from the vendor directory, or `CN`.
    pub region: String,
    /// IANA zone name sent in the client fingerprint.
    pub timezone: Option<String>,
    pub locale: String,
    pub timeout: Duration,
    /// Overrides for the passport host and domestic gateway.
    pub passport_url: Option<String>,
    pub domestic_gateway: Option<String>,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            region: DEFAULT_REGION.into(),
            timezone: None,
            locale: "en-US".into(),
            timeout: Duration::from_secs(30),
            passport_url: None,
            domestic_gateway: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub(crate) fn credentials(&self) -> Result<Credentials, CoreError> {
        if self.username.trim().is_empty() {
            return Err(CoreError::Config {
                message: "username must not be empty".into(),
            });
        }
        let mut credentials = Credentials::new(
            self.username.clone(),
            self.password.clone(),
            self.region.clone(),
        );
        credentials.timezone.clone_from(&self.timezone);
        Ok(credentials)
    }

    pub(crate) fn endpoints(&self) -> Result<Endpoints, CoreError> {
        let passport = self.passport_url.as_deref().unwrap_or(PASSPORT_URL);
        let gateway = self.domestic_gateway.as_deref().unwrap_or(DOMESTIC_GATEWAY);
        Endpoints::new(passport, gateway).map_err(|e| CoreError::Config {
            message: format!("invalid endpoint URL: {e}"),
        })
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            locale: self.locale.clone(),
            retry: self.retry.clone(),
            ..TransportConfig::default()
        }
    }
}
