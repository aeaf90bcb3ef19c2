//! IoT sensor-scoring service client.
//!
//! `POST /iot` accepts either a JSON document of readings or a multipart CSV
//! upload and returns an environmental health score with a per-parameter
//! breakdown. `GET /iot/synthetic` generates fallback readings when the NGO
//! supplied no sensor data.

use crate::config::ServiceKind;
use crate::error::{check_status, ClientError};
use crate::ServiceClient;
use ecoledger_types::{IotPayload, Score};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score detail for one sensor parameter (soil moisture, salinity, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterScore {
    pub score: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub mean_value: Option<f64>,
    #[serde(default)]
    pub readings_count: u64,
    #[serde(default)]
    pub unit: String,
}

/// Response from `POST /iot`.
#[derive(Debug, Clone, Deserialize)]
pub struct IotResult {
    #[serde(rename = "IoT_Score")]
    pub iot_score: Score,
    #[serde(rename = "Parameter_Scores", default)]
    pub parameter_scores: BTreeMap<String, ParameterScore>,
    #[serde(rename = "Health_Status", default)]
    pub health_status: String,
}

/// One synthetic sensor reading from `GET /iot/synthetic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: String,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub salinity: f64,
    pub ph: f64,
    pub dissolved_oxygen: f64,
}

/// Response from `GET /iot/synthetic`.
#[derive(Debug, Clone, Deserialize)]
pub struct SyntheticReadings {
    pub synthetic_data: Vec<SensorReading>,
}

impl ServiceClient {
    /// Score supplied sensor data (JSON readings or an uploaded CSV).
    pub async fn score_iot(&self, payload: &IotPayload) -> Result<IotResult, ClientError> {
        let url = self.endpoints().url(ServiceKind::Iot, "/iot");

        let request = match payload {
            IotPayload::Json(value) => self.http().post(&url).json(value),
            IotPayload::Csv(file) => {
                let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.name.clone());
                let form = reqwest::multipart::Form::new().part("file", part);
                self.http().post(&url).multipart(form)
            }
        };

        let response = request.send().await.map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;

        let result: IotResult = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse IoT response: {e}"))
        })?;

        tracing::debug!(
            iot_score = result.iot_score.value(),
            parameters = result.parameter_scores.len(),
            "IoT scoring complete"
        );
        Ok(result)
    }

    /// Fetch synthetic sensor readings for runs with no supplied IoT data.
    pub async fn synthetic_iot(
        &self,
        readings: u32,
        days: u32,
    ) -> Result<Vec<SensorReading>, ClientError> {
        let url = self.endpoints().url(ServiceKind::Iot, "/iot/synthetic");

        let response = self
            .http()
            .get(&url)
            .query(&[("readings", readings), ("days", days)])
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;

        let result: SyntheticReadings = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse synthetic IoT response: {e}"))
        })?;
        Ok(result.synthetic_data)
    }
}

/// Wrap generated readings in the JSON envelope the scoring endpoint expects.
pub fn readings_to_payload(readings: &[SensorReading]) -> Result<IotPayload, ClientError> {
    let value = serde_json::to_value(readings)
        .map_err(|e| ClientError::Validation(format!("failed to encode readings: {e}")))?;
    Ok(IotPayload::Json(serde_json::json!({ "readings": value })))
}
