// ── Runtime connection configuration ──
//
// Describes *how* to reach the TowerOps API. Carries the credential and
// connection tuning, never touches disk; `towerops-config` (or any caller)
// builds a `ClientConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use towerops_api::{ToweropsClient, TransportConfig};

use crate::error::CoreError;

/// Connection settings for one TowerOps account.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL. `None` targets the production service.
    pub base_url: Option<Url>,
    /// Bearer token sent on every request.
    pub token: SecretString,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(token: SecretString) -> Self {
        Self {
            base_url: None,
            token,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the HTTP client these settings describe.
    pub fn build_client(&self) -> Result<ToweropsClient, CoreError> {
        let transport = TransportConfig::default().with_timeout(self.timeout);
        let base_url = self.base_url.as_ref().map_or("", Url::as_str);

        ToweropsClient::new(base_url, &self.token, &transport).map_err(|e| CoreError::Config {
            message: format!("cannot build TowerOps client: {e}"),
        })
    }
}
