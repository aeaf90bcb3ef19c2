//! CO2 estimation service client.
//!
//! `POST /co2` with the detected tree count returns the estimated annual
//! absorption in kilograms and tonnes.

use crate::config::ServiceKind;
use crate::error::{check_status, ClientError};
use crate::ServiceClient;
use serde::{Deserialize, Serialize};

/// Request body for `POST /co2`.
#[derive(Debug, Clone, Serialize)]
pub struct Co2Request {
    #[serde(rename = "Tree_Count")]
    pub tree_count: u32,
}

/// Response from `POST /co2`.
#[derive(Debug, Clone, Deserialize)]
pub struct Co2Result {
    #[serde(rename = "CO2_absorbed_kg")]
    pub co2_absorbed_kg: f64,
    #[serde(rename = "CO2_absorbed_tonnes", default)]
    pub co2_absorbed_tonnes: f64,
}

impl ServiceClient {
    /// Estimate annual CO2 absorption for a detected tree count.
    pub async fn estimate_co2(&self, tree_count: u32) -> Result<Co2Result, ClientError> {
        let url = self.endpoints().url(ServiceKind::Co2, "/co2");

        let response = self
            .http()
            .post(&url)
            .json(&Co2Request { tree_count })
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;

        let result: Co2Result = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse CO2 response: {e}"))
        })?;

        tracing::debug!(
            tree_count,
            co2_kg = result.co2_absorbed_kg,
            "CO2 estimation complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_wire_field_name() {
        let body = serde_json::to_value(Co2Request { tree_count: 45 }).unwrap();
        assert_eq!(body, serde_json::json!({ "Tree_Count": 45 }));
    }

    #[test]
    fn deserializes_co2_response() {
        let json = r#"{
            "CO2_absorbed_kg": 553.5,
            "CO2_absorbed_tonnes": 0.553,
            "Calculation_Basis": {"co2_per_tree_kg_year": 12.3}
        }"#;
        let result: Co2Result = serde_json::from_str(json).unwrap();
        assert!((result.co2_absorbed_kg - 553.5).abs() < f64::EPSILON);
    }
}
