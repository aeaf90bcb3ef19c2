use crate::report::PartialReport;
use ecoledger_types::TypeError;
use std::fmt;
use thiserror::Error;

/// The seven network stages of a verification run, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    TreeDetection,
    Ndvi,
    Iot,
    Co2,
    FinalScore,
    LedgerSubmit,
    CreditIssuance,
}

impl PipelineStage {
    pub const COUNT: usize = 7;

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::TreeDetection => "tree detection",
            PipelineStage::Ndvi => "NDVI analysis",
            PipelineStage::Iot => "IoT scoring",
            PipelineStage::Co2 => "CO2 estimation",
            PipelineStage::FinalScore => "final scoring",
            PipelineStage::LedgerSubmit => "ledger submission",
            PipelineStage::CreditIssuance => "credit issuance",
        }
    }

    /// 1-based position within the run.
    pub fn step(&self) -> usize {
        match self {
            PipelineStage::TreeDetection => 1,
            PipelineStage::Ndvi => 2,
            PipelineStage::Iot => 3,
            PipelineStage::Co2 => 4,
            PipelineStage::FinalScore => 5,
            PipelineStage::LedgerSubmit => 6,
            PipelineStage::CreditIssuance => 7,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (step {} of {})", self.label(), self.step(), Self::COUNT)
    }
}

/// A verification run that did not produce a full report.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input rejected before any network call was made.
    #[error("invalid verification input: {0}")]
    Input(#[from] TypeError),

    /// A service call failed; the run stopped at `stage`.
    #[error("{stage} failed: {message}")]
    Stage {
        stage: PipelineStage,
        /// Normalized service error message.
        message: String,
        /// Results of the stages completed before the failure.
        completed: Box<PartialReport>,
    },
}

impl PipelineError {
    /// The stage the run failed at, if it got past input validation.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::Input(_) => None,
            PipelineError::Stage { stage, .. } => Some(*stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display_counts_steps() {
        assert_eq!(
            PipelineStage::TreeDetection.to_string(),
            "tree detection (step 1 of 7)"
        );
        assert_eq!(
            PipelineStage::CreditIssuance.to_string(),
            "credit issuance (step 7 of 7)"
        );
    }

    #[test]
    fn input_error_has_no_stage() {
        let err = PipelineError::Input(TypeError::ClaimedTreesZero);
        assert!(err.stage().is_none());
    }
}
