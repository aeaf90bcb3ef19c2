//! HTTP clients for the six EcoLedger verification services.
//!
//! Each service gets a module with its wire DTOs and typed request methods,
//! all sharing one [`ServiceClient`] (connection pool, timeouts, endpoint
//! configuration). Errors from every service collapse through a single
//! normalization routine in [`error`].

pub mod co2;
pub mod config;
pub mod error;
pub mod finalscore;
pub mod health;
pub mod iot;
pub mod ledger;
pub mod ndvi;
pub mod tree;

pub use config::{ServiceEndpoints, ServiceKind};
pub use error::ClientError;
pub use health::{check_all, ServiceHealth};

use std::time::Duration;

/// Default timeout for verification service requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client for all EcoLedger services.
///
/// Wraps `reqwest::Client` (a reusable connection pool) together with the
/// per-service base URLs. Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    endpoints: ServiceEndpoints,
}

impl ServiceClient {
    /// Create a client with the default 30s request timeout.
    pub fn new(endpoints: ServiceEndpoints) -> Result<Self, ClientError> {
        Self::with_timeout(endpoints, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        endpoints: ServiceEndpoints,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Validation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, endpoints })
    }

    /// The configured service endpoints.
    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}
