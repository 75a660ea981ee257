//! Client configuration.

use crate::credentials::Credentials;
use crate::error::ApiError;

/// Publishing API host.
///
/// Requests are signed over `METHOD\npath?query` with a `timestamp`
/// parameter (see `crate::signer`). The vendor's legacy scheme signs only
/// `path?query`, so pointing this client at a host that verifies the legacy
/// form will fail signature checks.
pub const DEFAULT_BASE_URL: &str = "https://publishing-api.singleplatform.com";
/// Dashboard host serving the cookie-authenticated hierarchy listing.
pub const DEFAULT_DASHBOARD_URL: &str = "https://my2.singleplatform.com";

pub const ENV_CLIENT_ID: &str = "SINGLEPLATFORM_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SINGLEPLATFORM_CLIENT_SECRET";
pub const ENV_BASE_URL: &str = "SINGLEPLATFORM_BASE_URL";
pub const ENV_DASHBOARD_URL: &str = "SINGLEPLATFORM_DASHBOARD_URL";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub dashboard_url: String,
    pub credentials: Credentials,
}

impl ClientConfig {
    /// Vendor hosts with the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            credentials,
        }
    }

    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// `SINGLEPLATFORM_CLIENT_ID` and `SINGLEPLATFORM_CLIENT_SECRET` are
    /// required; the two URL variables override the vendor defaults.
    ///
    /// # Errors
    /// `ApiError::Configuration` if a required variable is missing.
    pub fn from_env() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();

        let credentials = Credentials::from_env_vars(ENV_CLIENT_ID, ENV_CLIENT_SECRET)?;
        let mut config = Self::new(credentials);
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(&url);
        }
        if let Ok(url) = std::env::var(ENV_DASHBOARD_URL) {
            config = config.with_dashboard_url(&url);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_dashboard_url(mut self, url: &str) -> Self {
        self.dashboard_url = url.trim_end_matches('/').to_string();
        self
    }
}
