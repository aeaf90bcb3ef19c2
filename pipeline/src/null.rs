//! Scripted service double for deterministic pipeline tests.
//!
//! Records every request it receives and answers from a fixed script,
//! computing the final score with the published weighted formula so test
//! expectations match the real scoring model. Never touches the network.

use crate::error::PipelineStage;
use crate::services::VerificationServices;
use ecoledger_clients::co2::Co2Result;
use ecoledger_clients::finalscore::{FinalScoreRequest, FinalScoreResult, VerificationStatus};
use ecoledger_clients::iot::{IotResult, SensorReading};
use ecoledger_clients::ledger::{IssueReceipt, IssueRequest, SubmitReceipt, SubmitRequest};
use ecoledger_clients::ndvi::NdviResult;
use ecoledger_clients::tree::TreeDetectionResult;
use ecoledger_clients::ClientError;
use ecoledger_types::{EvidenceFile, IotPayload, Score, ScoringParams};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// One request the double received, with the arguments that matter for
/// assertions.
#[derive(Clone, Debug)]
pub enum RecordedCall {
    DetectTrees { image_name: String },
    AnalyzeNdvi { image_name: String, multispectral: bool },
    ScoreIot { payload: IotPayload },
    SyntheticIot { readings: u32, days: u32 },
    EstimateCo2 { tree_count: u32 },
    FinalScore { request: FinalScoreRequest },
    SubmitReport { ngo_id: String, project_id: String },
    IssueCredits { request: IssueRequest },
}

/// A test services implementation that records calls instead of making them.
pub struct NullServices {
    params: ScoringParams,
    tree_count: u32,
    ndvi_score: Score,
    iot_score: Score,
    fail_at: Option<PipelineStage>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl NullServices {
    /// A double scripted with the documented worked example: 45 detected
    /// trees, NDVI 0.742, IoT 0.658.
    pub fn healthy() -> Self {
        Self {
            params: ScoringParams::ecoledger_defaults(),
            tree_count: 45,
            ndvi_score: Score::clamped(0.742),
            iot_score: Score::clamped(0.658),
            fail_at: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_tree_count(mut self, tree_count: u32) -> Self {
        self.tree_count = tree_count;
        self
    }

    pub fn with_ndvi_score(mut self, score: f64) -> Self {
        self.ndvi_score = Score::clamped(score);
        self
    }

    pub fn with_iot_score(mut self, score: f64) -> Self {
        self.iot_score = Score::clamped(score);
        self
    }

    /// Fail the call belonging to `stage` with a scripted service error.
    pub fn failing_at(mut self, stage: PipelineStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Every request received so far, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check_failure(&self, stage: PipelineStage) -> Result<(), ClientError> {
        if self.fail_at == Some(stage) {
            return Err(ClientError::Service(format!(
                "scripted failure in {}",
                stage.label()
            )));
        }
        Ok(())
    }
}

impl VerificationServices for NullServices {
    async fn detect_trees(&self, image: &EvidenceFile) -> Result<TreeDetectionResult, ClientError> {
        self.record(RecordedCall::DetectTrees {
            image_name: image.name.clone(),
        });
        self.check_failure(PipelineStage::TreeDetection)?;
        Ok(TreeDetectionResult {
            tree_count: self.tree_count,
            boxes: Vec::new(),
            detection_method: "scripted".into(),
        })
    }

    async fn analyze_ndvi(
        &self,
        image: &EvidenceFile,
        multispectral: bool,
    ) -> Result<NdviResult, ClientError> {
        self.record(RecordedCall::AnalyzeNdvi {
            image_name: image.name.clone(),
            multispectral,
        });
        self.check_failure(PipelineStage::Ndvi)?;
        Ok(NdviResult {
            ndvi_score: self.ndvi_score,
            mean_ndvi: self.ndvi_score.value() * 0.73,
            health_classification: "Good".into(),
            calculation_method: "scripted".into(),
        })
    }

    async fn score_iot(&self, payload: &IotPayload) -> Result<IotResult, ClientError> {
        self.record(RecordedCall::ScoreIot {
            payload: payload.clone(),
        });
        self.check_failure(PipelineStage::Iot)?;
        Ok(IotResult {
            iot_score: self.iot_score,
            parameter_scores: BTreeMap::new(),
            health_status: "Good".into(),
        })
    }

    async fn synthetic_iot(
        &self,
        readings: u32,
        days: u32,
    ) -> Result<Vec<SensorReading>, ClientError> {
        self.record(RecordedCall::SyntheticIot { readings, days });
        self.check_failure(PipelineStage::Iot)?;
        let generated = (0..readings)
            .map(|i| SensorReading {
                timestamp: format!("2025-01-01T00:{:02}:00", i % 60),
                soil_moisture: 72.0,
                temperature: 28.0,
                salinity: 23.0,
                ph: 7.3,
                dissolved_oxygen: 6.0,
            })
            .collect();
        Ok(generated)
    }

    async fn estimate_co2(&self, tree_count: u32) -> Result<Co2Result, ClientError> {
        self.record(RecordedCall::EstimateCo2 { tree_count });
        self.check_failure(PipelineStage::Co2)?;
        let kg = self.params.co2_absorbed_kg(tree_count);
        Ok(Co2Result {
            co2_absorbed_kg: kg,
            co2_absorbed_tonnes: kg / 1000.0,
        })
    }

    async fn final_score(
        &self,
        request: &FinalScoreRequest,
    ) -> Result<FinalScoreResult, ClientError> {
        self.record(RecordedCall::FinalScore {
            request: request.clone(),
        });
        self.check_failure(PipelineStage::FinalScore)?;

        let tree = self
            .params
            .tree_accuracy(request.tree_count, request.claimed_trees);
        let final_score = self.params.weighted_score(
            tree,
            request.ndvi_score,
            request.iot_score,
            request.audit_check,
        );
        let co2_kg = request
            .co2_absorbed_kg
            .unwrap_or_else(|| self.params.co2_absorbed_kg(request.tree_count));
        let carbon_credits = self.params.carbon_credits(co2_kg, final_score);
        let eligible = self.params.credits_eligible(
            tree,
            request.ndvi_score,
            request.iot_score,
            final_score,
        );

        let mut individual = BTreeMap::new();
        individual.insert("AI_Tree_Score".to_string(), tree.value());
        individual.insert("NDVI_Score".to_string(), request.ndvi_score.value());
        individual.insert("IoT_Score".to_string(), request.iot_score.value());
        individual.insert("Audit_Check".to_string(), request.audit_check.value());

        Ok(FinalScoreResult {
            final_score,
            carbon_credits,
            co2_absorbed_kg: co2_kg,
            verification_status: VerificationStatus {
                status: if eligible { "Good" } else { "Insufficient" }.into(),
                level: if eligible { "A" } else { "D" }.into(),
                credits_eligible: eligible,
                quality_grade: "Standard".into(),
            },
            individual_scores: individual,
        })
    }

    async fn submit_report(&self, request: &SubmitRequest) -> Result<SubmitReceipt, ClientError> {
        self.record(RecordedCall::SubmitReport {
            ngo_id: request.ngo_id.clone(),
            project_id: request.project_id.clone(),
        });
        self.check_failure(PipelineStage::LedgerSubmit)?;
        Ok(SubmitReceipt {
            report_id: "report-0001".into(),
            transaction_id: "tx-0001".into(),
            block_number: 1,
            block_hash: "00ab".into(),
            data_hash: "11cd".into(),
            status: "submitted".into(),
        })
    }

    async fn issue_credits(&self, request: &IssueRequest) -> Result<IssueReceipt, ClientError> {
        self.record(RecordedCall::IssueCredits {
            request: request.clone(),
        });
        self.check_failure(PipelineStage::CreditIssuance)?;
        Ok(IssueReceipt {
            credit_id: "credit-0001".into(),
            transaction_id: "tx-0002".into(),
            block_number: 2,
            block_hash: "22ef".into(),
            amount: request.amount,
            status: "issued".into(),
        })
    }
}
