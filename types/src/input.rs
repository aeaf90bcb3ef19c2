//! The caller-supplied input for one verification run.

use crate::error::TypeError;
use crate::score::Score;
use serde::{Deserialize, Serialize};

/// An uploaded evidence file (image or sensor CSV) held in memory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvidenceFile {
    /// Original file name, forwarded in multipart uploads.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl EvidenceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Sensor data supplied with a verification run.
///
/// The IoT service accepts either a JSON document of readings or an uploaded
/// CSV file; absent data falls back to synthetically generated readings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum IotPayload {
    Json(serde_json::Value),
    Csv(EvidenceFile),
}

/// Everything a verification run needs, immutable once the run starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationInput {
    pub ngo_id: String,
    pub project_id: String,
    pub project_name: String,
    /// Trees the NGO claims to have planted. Must be positive.
    pub claimed_trees: u32,
    /// Manually supplied human-inspection confidence.
    pub audit_check: Score,
    /// Mandatory tree-count evidence image.
    pub tree_image: EvidenceFile,
    /// Optional dedicated NDVI image; the tree image is reused when absent.
    pub ndvi_image: Option<EvidenceFile>,
    /// Whether the NDVI upload carries NIR bands (plain RGB estimation otherwise).
    pub multispectral: bool,
    /// Optional sensor data; synthetic readings are fetched when absent.
    pub iot_data: Option<IotPayload>,
    /// Price forwarded on credit issuance (USD per credit).
    pub price_per_credit: f64,
}

impl VerificationInput {
    /// Client-side validation, run before any network call.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.ngo_id.trim().is_empty() {
            return Err(TypeError::MissingField { field: "ngo_id" });
        }
        if self.project_id.trim().is_empty() {
            return Err(TypeError::MissingField { field: "project_id" });
        }
        if self.claimed_trees == 0 {
            return Err(TypeError::ClaimedTreesZero);
        }
        if self.tree_image.is_empty() {
            return Err(TypeError::MissingTreeImage);
        }
        if let Some(ndvi) = &self.ndvi_image {
            if ndvi.is_empty() {
                return Err(TypeError::EmptyEvidenceFile(ndvi.name.clone()));
            }
        }
        if let Some(IotPayload::Csv(csv)) = &self.iot_data {
            if csv.is_empty() {
                return Err(TypeError::EmptyEvidenceFile(csv.name.clone()));
            }
        }
        if self.price_per_credit <= 0.0 || !self.price_per_credit.is_finite() {
            return Err(TypeError::InvalidPrice(self.price_per_credit));
        }
        Ok(())
    }
}
