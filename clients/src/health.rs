//! Concurrent health aggregation across all verification services.
//!
//! One `GET /health` probe per service, fanned out with `tokio::spawn` so a
//! hung service cannot delay the others. The aggregate always contains one
//! entry per service in a fixed order and never fails as a whole.

use crate::config::{ServiceEndpoints, ServiceKind};
use crate::error::ClientError;
use serde::Deserialize;
use std::time::Duration;

/// Health probes get a tighter deadline than verification requests.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe outcome for one service.
#[derive(Debug, Clone)]
pub struct ServiceHealth {
    pub service: ServiceKind,
    pub healthy: bool,
    /// Failure detail when unhealthy, absent when healthy.
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    #[serde(default)]
    #[allow(dead_code)]
    service: String,
}

/// Probe every service's `/health` endpoint concurrently.
///
/// Returns one [`ServiceHealth`] per service, in [`ServiceKind::ALL`] order,
/// regardless of how many probes fail.
pub async fn check_all(endpoints: &ServiceEndpoints) -> Vec<ServiceHealth> {
    let mut handles = Vec::with_capacity(ServiceKind::ALL.len());
    for kind in ServiceKind::ALL {
        let url = endpoints.url(kind, "/health");
        handles.push((kind, tokio::spawn(probe(url))));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (kind, handle) in handles {
        let health = match handle.await {
            Ok(Ok(())) => ServiceHealth {
                service: kind,
                healthy: true,
                detail: None,
            },
            Ok(Err(e)) => {
                tracing::warn!(service = %kind, error = %e, "health probe failed");
                ServiceHealth {
                    service: kind,
                    healthy: false,
                    detail: Some(e.to_string()),
                }
            }
            Err(e) => ServiceHealth {
                service: kind,
                healthy: false,
                detail: Some(format!("health probe panicked: {e}")),
            },
        };
        results.push(health);
    }
    results
}

async fn probe(url: String) -> Result<(), ClientError> {
    let client = reqwest::Client::builder()
        .timeout(HEALTH_TIMEOUT)
        .connect_timeout(HEALTH_TIMEOUT)
        .build()
        .map_err(|e| ClientError::Validation(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(ClientError::from_transport)?;
    if !response.status().is_success() {
        return Err(ClientError::Service(format!(
            "health endpoint returned HTTP {}",
            response.status()
        )));
    }

    let body: HealthResponse = response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(format!("malformed health response: {e}")))?;
    if body.status != "healthy" {
        return Err(ClientError::Service(format!(
            "service reported status {:?}",
            body.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_endpoints() -> ServiceEndpoints {
        let mut endpoints = ServiceEndpoints::default();
        for kind in ServiceKind::ALL {
            // Port 1 is never listening locally; connects fail fast.
            endpoints.set(kind, "http://127.0.0.1:1".into());
        }
        endpoints
    }

    #[tokio::test]
    async fn unreachable_services_report_unhealthy_in_order() {
        let results = check_all(&unreachable_endpoints()).await;
        assert_eq!(results.len(), ServiceKind::ALL.len());
        for (result, kind) in results.iter().zip(ServiceKind::ALL) {
            assert_eq!(result.service, kind);
            assert!(!result.healthy);
            assert!(result.detail.is_some());
        }
    }

    #[tokio::test]
    async fn one_dead_service_does_not_hide_the_rest() {
        let mut endpoints = unreachable_endpoints();
        endpoints.set(ServiceKind::Ledger, "http://127.0.0.1:2".into());
        let results = check_all(&endpoints).await;
        assert_eq!(results.len(), ServiceKind::ALL.len());
        let ledger = results
            .iter()
            .find(|r| r.service == ServiceKind::Ledger)
            .unwrap();
        assert!(!ledger.healthy);
    }
}
