//! The verification orchestrator — sequences the service calls of one
//! verification run and buffers progress events for the caller.

use crate::error::{PipelineError, PipelineStage};
use crate::report::{PartialReport, VerificationReport};
use crate::services::VerificationServices;
use ecoledger_clients::finalscore::{FinalScoreRequest, FinalScoreResult};
use ecoledger_clients::iot::readings_to_payload;
use ecoledger_clients::ledger::{IssueRequest, SubmitRequest};
use ecoledger_clients::ClientError;
use ecoledger_types::{Score, VerificationInput};

/// Synthetic-readings fallback: number of generated readings.
pub const SYNTHETIC_READINGS: u32 = 100;

/// Synthetic-readings fallback: time span in days.
pub const SYNTHETIC_DAYS: u32 = 30;

/// Progress events emitted during a run, drained by the caller.
#[derive(Clone, Debug)]
pub enum RunEvent {
    StageStarted {
        stage: PipelineStage,
    },
    TreesDetected {
        count: u32,
    },
    NdviScored {
        score: Score,
        /// The tree image stood in for a missing NDVI upload.
        fallback_image: bool,
    },
    IotScored {
        score: Score,
        /// Synthetic readings stood in for missing sensor data.
        synthetic: bool,
    },
    Co2Estimated {
        kg: f64,
    },
    FinalScored {
        score: Score,
        carbon_credits: f64,
        credits_eligible: bool,
    },
    ReportSubmitted {
        report_id: String,
        block_number: u64,
    },
    CreditsIssued {
        credit_id: String,
        amount: f64,
    },
    IssuanceSkipped {
        reason: String,
    },
}

/// Drives one verification run through the services, in strict stage order.
///
/// Each stage runs exactly once; the first failure aborts the remainder and
/// surfaces the results accumulated so far. Runs share no mutable state
/// beyond the event buffer, which [`drain_events`](Self::drain_events)
/// empties.
pub struct Orchestrator<S> {
    services: S,
    pending_events: Vec<RunEvent>,
}

impl<S: VerificationServices> Orchestrator<S> {
    pub fn new(services: S) -> Self {
        Self {
            services,
            pending_events: Vec::new(),
        }
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    /// Take all buffered progress events, oldest first.
    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit(&mut self, event: RunEvent) {
        self.pending_events.push(event);
    }

    /// Run the full verification pipeline for one input.
    pub async fn run(
        &mut self,
        input: &VerificationInput,
    ) -> Result<VerificationReport, PipelineError> {
        input.validate()?;
        let mut partial = PartialReport::default();

        // Stage 1: tree detection. Everything downstream depends on the count.
        self.emit(RunEvent::StageStarted {
            stage: PipelineStage::TreeDetection,
        });
        let tree = self
            .services
            .detect_trees(&input.tree_image)
            .await
            .map_err(|e| stage_failure(PipelineStage::TreeDetection, &e, &partial))?;
        tracing::info!(tree_count = tree.tree_count, "trees detected");
        self.emit(RunEvent::TreesDetected {
            count: tree.tree_count,
        });
        partial.tree = Some(tree.clone());

        // Stage 2: NDVI, reusing the tree image when no dedicated upload exists.
        self.emit(RunEvent::StageStarted {
            stage: PipelineStage::Ndvi,
        });
        let (ndvi_image, ndvi_fallback) = match &input.ndvi_image {
            Some(image) => (image, false),
            None => (&input.tree_image, true),
        };
        let ndvi = self
            .services
            .analyze_ndvi(ndvi_image, input.multispectral)
            .await
            .map_err(|e| stage_failure(PipelineStage::Ndvi, &e, &partial))?;
        tracing::info!(
            ndvi_score = ndvi.ndvi_score.value(),
            fallback = ndvi_fallback,
            "NDVI analyzed"
        );
        self.emit(RunEvent::NdviScored {
            score: ndvi.ndvi_score,
            fallback_image: ndvi_fallback,
        });
        partial.ndvi = Some(ndvi.clone());

        // Stage 3: IoT, generating synthetic readings when no data was supplied.
        self.emit(RunEvent::StageStarted {
            stage: PipelineStage::Iot,
        });
        let (payload, iot_synthetic) = match &input.iot_data {
            Some(payload) => (payload.clone(), false),
            None => {
                let readings = self
                    .services
                    .synthetic_iot(SYNTHETIC_READINGS, SYNTHETIC_DAYS)
                    .await
                    .map_err(|e| stage_failure(PipelineStage::Iot, &e, &partial))?;
                let payload = readings_to_payload(&readings)
                    .map_err(|e| stage_failure(PipelineStage::Iot, &e, &partial))?;
                (payload, true)
            }
        };
        let iot = self
            .services
            .score_iot(&payload)
            .await
            .map_err(|e| stage_failure(PipelineStage::Iot, &e, &partial))?;
        tracing::info!(
            iot_score = iot.iot_score.value(),
            synthetic = iot_synthetic,
            "IoT data scored"
        );
        self.emit(RunEvent::IotScored {
            score: iot.iot_score,
            synthetic: iot_synthetic,
        });
        partial.iot = Some(iot.clone());

        // Stage 4: CO2 from the exact detected count.
        self.emit(RunEvent::StageStarted {
            stage: PipelineStage::Co2,
        });
        let co2 = self
            .services
            .estimate_co2(tree.tree_count)
            .await
            .map_err(|e| stage_failure(PipelineStage::Co2, &e, &partial))?;
        self.emit(RunEvent::Co2Estimated {
            kg: co2.co2_absorbed_kg,
        });
        partial.co2 = Some(co2.clone());

        // Stage 5: final weighted score.
        self.emit(RunEvent::StageStarted {
            stage: PipelineStage::FinalScore,
        });
        let score_request = FinalScoreRequest {
            tree_count: tree.tree_count,
            claimed_trees: input.claimed_trees,
            ndvi_score: ndvi.ndvi_score,
            iot_score: iot.iot_score,
            audit_check: input.audit_check,
            co2_absorbed_kg: Some(co2.co2_absorbed_kg),
        };
        let outcome = self
            .services
            .final_score(&score_request)
            .await
            .map_err(|e| stage_failure(PipelineStage::FinalScore, &e, &partial))?;
        tracing::info!(
            final_score = outcome.final_score.value(),
            carbon_credits = outcome.carbon_credits,
            eligible = outcome.verification_status.credits_eligible,
            "final score computed"
        );
        self.emit(RunEvent::FinalScored {
            score: outcome.final_score,
            carbon_credits: outcome.carbon_credits,
            credits_eligible: outcome.verification_status.credits_eligible,
        });
        partial.outcome = Some(outcome.clone());

        // Stage 6: anchor the aggregated report on the ledger.
        self.emit(RunEvent::StageStarted {
            stage: PipelineStage::LedgerSubmit,
        });
        let submit_request = SubmitRequest {
            ngo_id: input.ngo_id.clone(),
            project_id: input.project_id.clone(),
            verification_data: ledger_payload(input, tree.tree_count, &outcome),
        };
        let submission = self
            .services
            .submit_report(&submit_request)
            .await
            .map_err(|e| stage_failure(PipelineStage::LedgerSubmit, &e, &partial))?;
        self.emit(RunEvent::ReportSubmitted {
            report_id: submission.report_id.clone(),
            block_number: submission.block_number,
        });
        partial.submission = Some(submission.clone());

        // Stage 7: issue credits only for eligible outcomes with a positive amount.
        let issuance = if outcome.issuance_due() {
            self.emit(RunEvent::StageStarted {
                stage: PipelineStage::CreditIssuance,
            });
            let issue_request = IssueRequest {
                ngo_id: input.ngo_id.clone(),
                report_id: submission.report_id.clone(),
                amount: outcome.carbon_credits,
                price_per_credit: input.price_per_credit,
            };
            let receipt = self
                .services
                .issue_credits(&issue_request)
                .await
                .map_err(|e| stage_failure(PipelineStage::CreditIssuance, &e, &partial))?;
            self.emit(RunEvent::CreditsIssued {
                credit_id: receipt.credit_id.clone(),
                amount: receipt.amount,
            });
            Some(receipt)
        } else {
            let reason = if !outcome.verification_status.credits_eligible {
                "verification outcome not credit-eligible".to_string()
            } else {
                "no credits to issue".to_string()
            };
            tracing::info!(%reason, "credit issuance skipped");
            self.emit(RunEvent::IssuanceSkipped { reason });
            None
        };

        Ok(VerificationReport {
            ngo_id: input.ngo_id.clone(),
            project_id: input.project_id.clone(),
            project_name: input.project_name.clone(),
            claimed_trees: input.claimed_trees,
            tree,
            ndvi,
            ndvi_from_tree_image: ndvi_fallback,
            iot,
            iot_synthetic,
            co2,
            outcome,
            submission,
            issuance,
        })
    }
}

fn stage_failure(stage: PipelineStage, error: &ClientError, partial: &PartialReport) -> PipelineError {
    tracing::warn!(stage = %stage, error = %error, "verification stage failed");
    PipelineError::Stage {
        stage,
        message: error.to_string(),
        completed: Box::new(partial.clone()),
    }
}

/// The report document anchored on the ledger. Field names follow the
/// scoring service's wire vocabulary so stored reports read the same as
/// live responses.
fn ledger_payload(
    input: &VerificationInput,
    tree_count: u32,
    outcome: &FinalScoreResult,
) -> serde_json::Value {
    serde_json::json!({
        "project_name": input.project_name,
        "Claimed_Trees": input.claimed_trees,
        "Tree_Count": tree_count,
        "Audit_Check": input.audit_check,
        "Final_Score": outcome.final_score,
        "Carbon_Credits": outcome.carbon_credits,
        "CO2_absorbed_kg": outcome.co2_absorbed_kg,
        "Verification_Status": outcome.verification_status,
        "Individual_Scores": outcome.individual_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null::NullServices;
    use ecoledger_types::{EvidenceFile, Score};

    fn input() -> VerificationInput {
        VerificationInput {
            ngo_id: "ngo-001".into(),
            project_id: "proj-001".into(),
            project_name: "Sundarbans restoration".into(),
            claimed_trees: 50,
            audit_check: Score::clamped(0.85),
            tree_image: EvidenceFile::new("drone.jpg", vec![0xff, 0xd8]),
            ndvi_image: None,
            multispectral: false,
            iot_data: None,
            price_per_credit: 25.0,
        }
    }

    #[tokio::test]
    async fn drain_events_clears_buffer() {
        let mut orch = Orchestrator::new(NullServices::healthy());
        orch.run(&input()).await.unwrap();

        let events = orch.drain_events();
        assert!(!events.is_empty());
        assert!(orch.drain_events().is_empty());
    }

    #[tokio::test]
    async fn invalid_input_fails_before_any_call() {
        let mut orch = Orchestrator::new(NullServices::healthy());
        let mut bad = input();
        bad.claimed_trees = 0;

        let err = orch.run(&bad).await.unwrap_err();
        assert!(matches!(err, PipelineError::Input(_)));
        assert!(orch.services().calls().is_empty());
        assert!(orch.drain_events().is_empty());
    }

    #[tokio::test]
    async fn ledger_payload_carries_scoring_vocabulary() {
        let mut orch = Orchestrator::new(NullServices::healthy());
        let report = orch.run(&input()).await.unwrap();

        let payload = ledger_payload(&input(), report.tree.tree_count, &report.outcome);
        assert_eq!(payload["Tree_Count"], 45);
        assert_eq!(payload["Claimed_Trees"], 50);
        assert!(payload["Final_Score"].as_f64().unwrap() > 0.0);
    }
}
