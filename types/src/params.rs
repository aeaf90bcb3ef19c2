//! Scoring parameters — the weighted-formula constants published by the
//! final-score service, carried client-side for the scripted test double and
//! for display copy. The orchestrator never recomputes the service's value.

use crate::score::Score;
use serde::{Deserialize, Serialize};

/// Scoring weights, eligibility thresholds, and pricing defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoringParams {
    // ── Weighted formula ─────────────────────────────────────────────────
    /// Weight of the tree-detection accuracy (detected / claimed, capped at 1).
    pub tree_weight: f64,

    /// Weight of the NDVI vegetation-health score.
    pub ndvi_weight: f64,

    /// Weight of the IoT environmental score.
    pub iot_weight: f64,

    /// Weight of the manual audit check.
    pub audit_weight: f64,

    // ── Credit-eligibility thresholds (server-determined; mirrored here) ──
    /// Minimum final score for credit issuance.
    pub min_final_score: f64,

    /// Minimum tree-detection accuracy for credit issuance.
    pub min_tree_score: f64,

    /// Minimum NDVI score for credit issuance.
    pub min_ndvi_score: f64,

    /// Minimum IoT score for credit issuance.
    pub min_iot_score: f64,

    // ── Conversion and pricing ────────────────────────────────────────────
    /// CO2 absorption per tree, kg per year.
    pub co2_per_tree_kg: f64,

    /// Default price passed when issuing credits (USD per credit).
    pub default_price_per_credit: f64,

    /// Per-request timeout for remote calls, seconds.
    pub request_timeout_secs: u64,
}

impl ScoringParams {
    /// The published EcoLedger scoring model:
    /// `Final = 0.4×Tree + 0.3×NDVI + 0.2×IoT + 0.1×Audit`.
    pub fn ecoledger_defaults() -> Self {
        Self {
            tree_weight: 0.4,
            ndvi_weight: 0.3,
            iot_weight: 0.2,
            audit_weight: 0.1,
            min_final_score: 0.6,
            min_tree_score: 0.5,
            min_ndvi_score: 0.4,
            min_iot_score: 0.3,
            co2_per_tree_kg: 12.3,
            default_price_per_credit: 25.0,
            request_timeout_secs: 30,
        }
    }

    /// Tree-detection accuracy: detected / claimed, capped at 1.0.
    /// Zero claimed trees scores zero rather than dividing by zero.
    pub fn tree_accuracy(&self, detected: u32, claimed: u32) -> Score {
        if claimed == 0 {
            return Score::ZERO;
        }
        Score::clamped(f64::from(detected) / f64::from(claimed))
    }

    /// The weighted final score over the four clamped component signals.
    pub fn weighted_score(&self, tree: Score, ndvi: Score, iot: Score, audit: Score) -> Score {
        Score::clamped(
            self.tree_weight * tree.value()
                + self.ndvi_weight * ndvi.value()
                + self.iot_weight * iot.value()
                + self.audit_weight * audit.value(),
        )
    }

    /// CO2 absorbed (kg/year) for a detected tree count.
    pub fn co2_absorbed_kg(&self, tree_count: u32) -> f64 {
        f64::from(tree_count) * self.co2_per_tree_kg
    }

    /// Carbon credits: (CO2 kg / 1000) × final score.
    pub fn carbon_credits(&self, co2_absorbed_kg: f64, final_score: Score) -> f64 {
        (co2_absorbed_kg / 1000.0) * final_score.value()
    }

    /// Whether the component scores clear every issuance threshold.
    pub fn credits_eligible(&self, tree: Score, ndvi: Score, iot: Score, final_score: Score) -> bool {
        final_score.value() >= self.min_final_score
            && tree.value() >= self.min_tree_score
            && ndvi.value() >= self.min_ndvi_score
            && iot.value() >= self.min_iot_score
    }
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self::ecoledger_defaults()
    }
}
