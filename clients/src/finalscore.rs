//! Final-score service client.
//!
//! `POST /finalscore` combines the four verification signals into the
//! weighted final score, the carbon-credit figure, and the verification
//! status that gates credit issuance.

use crate::config::ServiceKind;
use crate::error::{check_status, ClientError};
use crate::ServiceClient;
use ecoledger_types::Score;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request body for `POST /finalscore`.
///
/// Field names match the service's wire contract exactly; `CO2_absorbed_kg`
/// feeds the CO2 stage's output forward and is re-derived server-side from
/// `Tree_Count` when absent.
#[derive(Debug, Clone, Serialize)]
pub struct FinalScoreRequest {
    #[serde(rename = "Tree_Count")]
    pub tree_count: u32,
    #[serde(rename = "Claimed_Trees")]
    pub claimed_trees: u32,
    #[serde(rename = "NDVI_Score")]
    pub ndvi_score: Score,
    #[serde(rename = "IoT_Score")]
    pub iot_score: Score,
    #[serde(rename = "Audit_Check")]
    pub audit_check: Score,
    #[serde(rename = "CO2_absorbed_kg", skip_serializing_if = "Option::is_none")]
    pub co2_absorbed_kg: Option<f64>,
}

/// Verification status attached to the final score.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VerificationStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub credits_eligible: bool,
    #[serde(default)]
    pub quality_grade: String,
}

/// Response from `POST /finalscore`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalScoreResult {
    #[serde(rename = "Final_Score")]
    pub final_score: Score,
    #[serde(rename = "Carbon_Credits")]
    pub carbon_credits: f64,
    #[serde(rename = "CO2_absorbed_kg", default)]
    pub co2_absorbed_kg: f64,
    #[serde(rename = "Verification_Status", default)]
    pub verification_status: VerificationStatus,
    #[serde(rename = "Individual_Scores", default)]
    pub individual_scores: BTreeMap<String, f64>,
}

impl FinalScoreResult {
    /// Whether this result qualifies for a credit-issuance call.
    pub fn issuance_due(&self) -> bool {
        self.verification_status.credits_eligible && self.carbon_credits > 0.0
    }
}

impl ServiceClient {
    /// Compute the weighted final score from the collected signals.
    pub async fn final_score(
        &self,
        request: &FinalScoreRequest,
    ) -> Result<FinalScoreResult, ClientError> {
        let url = self.endpoints().url(ServiceKind::FinalScore, "/finalscore");

        let response = self
            .http()
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;

        let result: FinalScoreResult = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse final score response: {e}"))
        })?;

        tracing::debug!(
            final_score = result.final_score.value(),
            carbon_credits = result.carbon_credits,
            eligible = result.verification_status.credits_eligible,
            "final scoring complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_wire_names() {
        let request = FinalScoreRequest {
            tree_count: 45,
            claimed_trees: 50,
            ndvi_score: Score::new(0.742).unwrap(),
            iot_score: Score::new(0.658).unwrap(),
            audit_check: Score::new(0.85).unwrap(),
            co2_absorbed_kg: Some(553.5),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["Tree_Count"], 45);
        assert_eq!(body["Claimed_Trees"], 50);
        assert_eq!(body["NDVI_Score"], 0.742);
        assert_eq!(body["Audit_Check"], 0.85);
        assert_eq!(body["CO2_absorbed_kg"], 553.5);
    }

    #[test]
    fn absent_co2_is_omitted() {
        let request = FinalScoreRequest {
            tree_count: 10,
            claimed_trees: 10,
            ndvi_score: Score::MAX,
            iot_score: Score::MAX,
            audit_check: Score::MAX,
            co2_absorbed_kg: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("CO2_absorbed_kg").is_none());
    }

    #[test]
    fn deserializes_final_score_response() {
        let json = r#"{
            "Final_Score": 0.7992,
            "Carbon_Credits": 0.4423,
            "CO2_absorbed_kg": 553.5,
            "Verification_Status": {
                "status": "Good",
                "level": "A",
                "credits_eligible": true,
                "confidence": 0.7992,
                "quality_grade": "Standard"
            },
            "Individual_Scores": {
                "AI_Tree_Score": 0.9,
                "NDVI_Score": 0.742,
                "IoT_Score": 0.658,
                "Audit_Check": 0.85
            }
        }"#;
        let result: FinalScoreResult = serde_json::from_str(json).unwrap();
        assert!((result.final_score.value() - 0.7992).abs() < f64::EPSILON);
        assert!(result.verification_status.credits_eligible);
        assert_eq!(result.verification_status.level, "A");
        assert!(result.issuance_due());
    }

    #[test]
    fn issuance_requires_positive_credits() {
        let json = r#"{
            "Final_Score": 0.65,
            "Carbon_Credits": 0.0,
            "Verification_Status": {"credits_eligible": true}
        }"#;
        let result: FinalScoreResult = serde_json::from_str(json).unwrap();
        assert!(!result.issuance_due());
    }
}
