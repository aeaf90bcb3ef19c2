//! NDVI vegetation-health service client.
//!
//! `POST /ndvi` with a multipart image (satellite or drone) plus a
//! `multispectral` form flag returns the NDVI score and a health
//! classification.

use crate::config::ServiceKind;
use crate::error::{check_status, ClientError};
use crate::ServiceClient;
use ecoledger_types::{EvidenceFile, Score};
use serde::Deserialize;

/// Response from `POST /ndvi`.
#[derive(Debug, Clone, Deserialize)]
pub struct NdviResult {
    #[serde(rename = "NDVI_Score")]
    pub ndvi_score: Score,
    #[serde(rename = "Mean_NDVI", default)]
    pub mean_ndvi: f64,
    #[serde(rename = "Health_Classification", default)]
    pub health_classification: String,
    #[serde(rename = "Calculation_Method", default)]
    pub calculation_method: String,
}

impl ServiceClient {
    /// Analyze vegetation health from an image.
    ///
    /// `multispectral` tells the service whether the upload carries NIR bands;
    /// plain RGB estimation is used otherwise.
    pub async fn analyze_ndvi(
        &self,
        image: &EvidenceFile,
        multispectral: bool,
    ) -> Result<NdviResult, ClientError> {
        let url = self.endpoints().url(ServiceKind::Ndvi, "/ndvi");

        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.name.clone());
        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("multispectral", if multispectral { "true" } else { "false" });

        let response = self
            .http()
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;

        let result: NdviResult = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse NDVI response: {e}"))
        })?;

        tracing::debug!(
            ndvi_score = result.ndvi_score.value(),
            classification = %result.health_classification,
            "NDVI analysis complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_ndvi_response() {
        let json = r#"{
            "NDVI_Score": 0.742,
            "Mean_NDVI": 0.542,
            "Health_Classification": "Good",
            "Calculation_Method": "RGB_Estimation",
            "Image_Size": {"width": 1024, "height": 768}
        }"#;
        let result: NdviResult = serde_json::from_str(json).unwrap();
        assert!((result.ndvi_score.value() - 0.742).abs() < f64::EPSILON);
        assert_eq!(result.health_classification, "Good");
    }

    #[test]
    fn score_outside_range_is_clamped() {
        let json = r#"{"NDVI_Score": 1.3}"#;
        let result: NdviResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.ndvi_score, Score::MAX);
    }
}
