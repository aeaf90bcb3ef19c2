//! Aggregated results of a verification run.

use ecoledger_clients::co2::Co2Result;
use ecoledger_clients::finalscore::FinalScoreResult;
use ecoledger_clients::iot::IotResult;
use ecoledger_clients::ledger::{IssueReceipt, SubmitReceipt};
use ecoledger_clients::ndvi::NdviResult;
use ecoledger_clients::tree::TreeDetectionResult;

/// Everything a completed verification run produced.
#[derive(Clone, Debug)]
pub struct VerificationReport {
    pub ngo_id: String,
    pub project_id: String,
    pub project_name: String,
    pub claimed_trees: u32,
    pub tree: TreeDetectionResult,
    pub ndvi: NdviResult,
    /// The tree image stood in for a missing NDVI upload.
    pub ndvi_from_tree_image: bool,
    pub iot: IotResult,
    /// Synthetic readings stood in for missing sensor data.
    pub iot_synthetic: bool,
    pub co2: Co2Result,
    pub outcome: FinalScoreResult,
    pub submission: SubmitReceipt,
    /// Present only when the outcome qualified for issuance.
    pub issuance: Option<IssueReceipt>,
}

impl VerificationReport {
    /// Whether credits were issued for this run.
    pub fn credits_issued(&self) -> bool {
        self.issuance.is_some()
    }
}

/// Stage results accumulated before a run failed.
///
/// Stages are strictly ordered, so a `None` here means the run never
/// reached that stage.
#[derive(Clone, Debug, Default)]
pub struct PartialReport {
    pub tree: Option<TreeDetectionResult>,
    pub ndvi: Option<NdviResult>,
    pub iot: Option<IotResult>,
    pub co2: Option<Co2Result>,
    pub outcome: Option<FinalScoreResult>,
    pub submission: Option<SubmitReceipt>,
}

impl PartialReport {
    /// Number of stages that completed before the failure.
    pub fn completed_stages(&self) -> usize {
        [
            self.tree.is_some(),
            self.ndvi.is_some(),
            self.iot.is_some(),
            self.co2.is_some(),
            self.outcome.is_some(),
            self.submission.is_some(),
        ]
        .iter()
        .filter(|done| **done)
        .count()
    }
}
