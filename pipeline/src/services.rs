//! The seam between the orchestrator and the backend services.

use ecoledger_clients::co2::Co2Result;
use ecoledger_clients::finalscore::{FinalScoreRequest, FinalScoreResult};
use ecoledger_clients::iot::{IotResult, SensorReading};
use ecoledger_clients::ledger::{IssueReceipt, IssueRequest, SubmitReceipt, SubmitRequest};
use ecoledger_clients::ndvi::NdviResult;
use ecoledger_clients::tree::TreeDetectionResult;
use ecoledger_clients::{ClientError, ServiceClient};
use ecoledger_types::{EvidenceFile, IotPayload};

/// Every service call a verification run can make.
///
/// Production runs go through [`HttpServices`]; tests script
/// [`crate::NullServices`] instead.
#[allow(async_fn_in_trait)]
pub trait VerificationServices {
    async fn detect_trees(&self, image: &EvidenceFile) -> Result<TreeDetectionResult, ClientError>;

    async fn analyze_ndvi(
        &self,
        image: &EvidenceFile,
        multispectral: bool,
    ) -> Result<NdviResult, ClientError>;

    async fn score_iot(&self, payload: &IotPayload) -> Result<IotResult, ClientError>;

    async fn synthetic_iot(
        &self,
        readings: u32,
        days: u32,
    ) -> Result<Vec<SensorReading>, ClientError>;

    async fn estimate_co2(&self, tree_count: u32) -> Result<Co2Result, ClientError>;

    async fn final_score(
        &self,
        request: &FinalScoreRequest,
    ) -> Result<FinalScoreResult, ClientError>;

    async fn submit_report(&self, request: &SubmitRequest) -> Result<SubmitReceipt, ClientError>;

    async fn issue_credits(&self, request: &IssueRequest) -> Result<IssueReceipt, ClientError>;
}

/// The real services, reached over HTTP through [`ServiceClient`].
#[derive(Clone)]
pub struct HttpServices {
    client: ServiceClient,
}

impl HttpServices {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }
}

impl VerificationServices for HttpServices {
    async fn detect_trees(&self, image: &EvidenceFile) -> Result<TreeDetectionResult, ClientError> {
        self.client.detect_trees(image).await
    }

    async fn analyze_ndvi(
        &self,
        image: &EvidenceFile,
        multispectral: bool,
    ) -> Result<NdviResult, ClientError> {
        self.client.analyze_ndvi(image, multispectral).await
    }

    async fn score_iot(&self, payload: &IotPayload) -> Result<IotResult, ClientError> {
        self.client.score_iot(payload).await
    }

    async fn synthetic_iot(
        &self,
        readings: u32,
        days: u32,
    ) -> Result<Vec<SensorReading>, ClientError> {
        self.client.synthetic_iot(readings, days).await
    }

    async fn estimate_co2(&self, tree_count: u32) -> Result<Co2Result, ClientError> {
        self.client.estimate_co2(tree_count).await
    }

    async fn final_score(
        &self,
        request: &FinalScoreRequest,
    ) -> Result<FinalScoreResult, ClientError> {
        self.client.final_score(request).await
    }

    async fn submit_report(&self, request: &SubmitRequest) -> Result<SubmitReceipt, ClientError> {
        self.client.submit_report(request).await
    }

    async fn issue_credits(&self, request: &IssueRequest) -> Result<IssueReceipt, ClientError> {
        self.client.issue_credits(request).await
    }
}
