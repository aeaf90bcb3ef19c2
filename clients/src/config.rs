//! Per-service endpoint configuration.
//!
//! One base URL per service, overridable with `ECOLEDGER_*_API_URL`
//! environment variables, defaulting to the fixed local development ports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six independently addressable EcoLedger services, in pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    TreeDetection,
    Ndvi,
    Iot,
    Co2,
    FinalScore,
    Ledger,
}

impl ServiceKind {
    /// All services, in the order health reports are listed.
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::TreeDetection,
        ServiceKind::Ndvi,
        ServiceKind::Iot,
        ServiceKind::Co2,
        ServiceKind::FinalScore,
        ServiceKind::Ledger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::TreeDetection => "tree-detection",
            ServiceKind::Ndvi => "ndvi",
            ServiceKind::Iot => "iot",
            ServiceKind::Co2 => "co2",
            ServiceKind::FinalScore => "final-score",
            ServiceKind::Ledger => "ledger",
        }
    }

    /// Environment variable carrying this service's base URL override.
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceKind::TreeDetection => "ECOLEDGER_TREE_API_URL",
            ServiceKind::Ndvi => "ECOLEDGER_NDVI_API_URL",
            ServiceKind::Iot => "ECOLEDGER_IOT_API_URL",
            ServiceKind::Co2 => "ECOLEDGER_CO2_API_URL",
            ServiceKind::FinalScore => "ECOLEDGER_SCORE_API_URL",
            ServiceKind::Ledger => "ECOLEDGER_LEDGER_API_URL",
        }
    }

    /// Default local development port for this service.
    fn default_port(&self) -> u16 {
        match self {
            ServiceKind::TreeDetection => 5001,
            ServiceKind::Ndvi => 5002,
            ServiceKind::Iot => 5003,
            ServiceKind::Co2 => 5004,
            ServiceKind::FinalScore => 5005,
            ServiceKind::Ledger => 5006,
        }
    }

    fn default_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.default_port())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URLs for every service. Trailing slashes are trimmed on access.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    pub tree_url: String,
    pub ndvi_url: String,
    pub iot_url: String,
    pub co2_url: String,
    pub score_url: String,
    pub ledger_url: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            tree_url: ServiceKind::TreeDetection.default_url(),
            ndvi_url: ServiceKind::Ndvi.default_url(),
            iot_url: ServiceKind::Iot.default_url(),
            co2_url: ServiceKind::Co2.default_url(),
            score_url: ServiceKind::FinalScore.default_url(),
            ledger_url: ServiceKind::Ledger.default_url(),
        }
    }
}

impl ServiceEndpoints {
    /// Defaults overlaid with any `ECOLEDGER_*_API_URL` variables set in the
    /// environment.
    pub fn from_env() -> Self {
        let mut endpoints = Self::default();
        for kind in ServiceKind::ALL {
            if let Ok(url) = std::env::var(kind.env_var()) {
                if !url.trim().is_empty() {
                    endpoints.set(kind, url);
                }
            }
        }
        endpoints
    }

    /// Base URL for a service, without a trailing slash.
    pub fn base_url(&self, kind: ServiceKind) -> &str {
        let url = match kind {
            ServiceKind::TreeDetection => &self.tree_url,
            ServiceKind::Ndvi => &self.ndvi_url,
            ServiceKind::Iot => &self.iot_url,
            ServiceKind::Co2 => &self.co2_url,
            ServiceKind::FinalScore => &self.score_url,
            ServiceKind::Ledger => &self.ledger_url,
        };
        url.trim_end_matches('/')
    }

    pub fn set(&mut self, kind: ServiceKind, url: String) {
        match kind {
            ServiceKind::TreeDetection => self.tree_url = url,
            ServiceKind::Ndvi => self.ndvi_url = url,
            ServiceKind::Iot => self.iot_url = url,
            ServiceKind::Co2 => self.co2_url = url,
            ServiceKind::FinalScore => self.score_url = url,
            ServiceKind::Ledger => self.ledger_url = url,
        }
    }

    /// Full URL for a path on a service, e.g. `url(Ledger, "/ledger/stats")`.
    pub fn url(&self, kind: ServiceKind, path: &str) -> String {
        format!("{}{}", self.base_url(kind), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_local_ports() {
        let endpoints = ServiceEndpoints::default();
        assert_eq!(
            endpoints.base_url(ServiceKind::TreeDetection),
            "http://127.0.0.1:5001"
        );
        assert_eq!(
            endpoints.base_url(ServiceKind::Ledger),
            "http://127.0.0.1:5006"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let mut endpoints = ServiceEndpoints::default();
        endpoints.set(ServiceKind::Ndvi, "http://ndvi.example.com/".into());
        assert_eq!(
            endpoints.base_url(ServiceKind::Ndvi),
            "http://ndvi.example.com"
        );
        assert_eq!(
            endpoints.url(ServiceKind::Ndvi, "/ndvi"),
            "http://ndvi.example.com/ndvi"
        );
    }

    #[test]
    fn toml_overrides_partial_fields() {
        let cfg: ServiceEndpoints =
            toml::from_str(r#"ledger_url = "http://ledger.example.com:9000""#).unwrap();
        assert_eq!(
            cfg.base_url(ServiceKind::Ledger),
            "http://ledger.example.com:9000"
        );
        // Unspecified services keep their defaults.
        assert_eq!(cfg.base_url(ServiceKind::Co2), "http://127.0.0.1:5004");
    }
}
