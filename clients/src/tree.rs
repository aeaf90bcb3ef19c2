//! Tree-detection service client.
//!
//! `POST /treecount` with a multipart image upload returns the detected tree
//! count and per-tree bounding boxes.

use crate::config::ServiceKind;
use crate::error::{check_status, ClientError};
use crate::ServiceClient;
use ecoledger_types::EvidenceFile;
use serde::Deserialize;

/// One detected tree.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub label: String,
    pub confidence: f64,
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

/// Response from `POST /treecount`.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeDetectionResult {
    #[serde(rename = "Tree_Count")]
    pub tree_count: u32,
    #[serde(rename = "Boxes", default)]
    pub boxes: Vec<BoundingBox>,
    #[serde(rename = "Detection_Method", default)]
    pub detection_method: String,
}

impl ServiceClient {
    /// Detect and count trees in an evidence image.
    pub async fn detect_trees(
        &self,
        image: &EvidenceFile,
    ) -> Result<TreeDetectionResult, ClientError> {
        let url = self
            .endpoints()
            .url(ServiceKind::TreeDetection, "/treecount");

        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.name.clone());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http()
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;

        let result: TreeDetectionResult = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse tree detection response: {e}"))
        })?;

        tracing::debug!(
            tree_count = result.tree_count,
            method = %result.detection_method,
            "tree detection complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_detection_response() {
        let json = r#"{
            "Tree_Count": 2,
            "Boxes": [
                {"label": "mangrove", "confidence": 0.91, "x1": 10, "y1": 20, "x2": 80, "y2": 120},
                {"label": "mangrove", "confidence": 0.74, "x1": 200, "y1": 30, "x2": 260, "y2": 150}
            ],
            "Image_Size": {"width": 640, "height": 480},
            "Detection_Method": "Simulated_YOLOv8"
        }"#;
        let result: TreeDetectionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.tree_count, 2);
        assert_eq!(result.boxes.len(), 2);
        assert_eq!(result.boxes[0].label, "mangrove");
        assert_eq!(result.detection_method, "Simulated_YOLOv8");
    }

    #[test]
    fn boxes_are_optional() {
        let json = r#"{"Tree_Count": 0}"#;
        let result: TreeDetectionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.tree_count, 0);
        assert!(result.boxes.is_empty());
    }
}
