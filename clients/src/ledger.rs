//! Ledger-simulation service client.
//!
//! The ledger persists verification reports into a simulated blockchain and
//! owns the lifecycle of issued carbon credits. All identities (report ids,
//! transaction ids, block numbers, hashes) are assigned by the ledger; the
//! client only reads them back.

use crate::config::ServiceKind;
use crate::error::{check_status, ClientError};
use crate::ServiceClient;
use serde::{Deserialize, Serialize};

/// Request body for `POST /ledger/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub ngo_id: String,
    pub project_id: String,
    /// The aggregated verification report, hashed and chained by the ledger.
    pub verification_data: serde_json::Value,
}

/// Receipt from `POST /ledger/submit`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitReceipt {
    pub report_id: String,
    pub transaction_id: String,
    pub block_number: u64,
    pub block_hash: String,
    #[serde(default)]
    pub data_hash: String,
    #[serde(default)]
    pub status: String,
}

/// Request body for `POST /ledger/issue`.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRequest {
    pub ngo_id: String,
    pub report_id: String,
    pub amount: f64,
    pub price_per_credit: f64,
}

/// Receipt from `POST /ledger/issue`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssueReceipt {
    pub credit_id: String,
    pub transaction_id: String,
    pub block_number: u64,
    #[serde(default)]
    pub block_hash: String,
    pub amount: f64,
    #[serde(default)]
    pub status: String,
}

/// Request body for `POST /ledger/transfer`.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub credit_id: String,
    pub from_ngo: String,
    pub to_company: String,
    /// Full credit amount is transferred when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Receipt from `POST /ledger/transfer`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferReceipt {
    pub transaction_id: String,
    pub block_number: u64,
    #[serde(default)]
    pub block_hash: String,
    pub credit_id: String,
    pub amount: f64,
    pub from_ngo: String,
    pub to_company: String,
    #[serde(default)]
    pub status: String,
}

/// A stored verification report returned by `GET /ledger/query/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredReport {
    pub report_id: String,
    pub ngo_id: String,
    pub project_id: String,
    pub verification_data: serde_json::Value,
    #[serde(default)]
    pub data_hash: String,
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub carbon_credits: Option<f64>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub block_hash: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
struct QueryResponse {
    report: StoredReport,
}

/// One listed credit from `GET /ledger/credits/available`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreditListing {
    pub credit_id: String,
    pub ngo_id: String,
    pub amount: f64,
    #[serde(default)]
    pub price_per_credit: Option<f64>,
    #[serde(default)]
    pub total_value: Option<f64>,
    #[serde(default)]
    pub report_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub final_score: Option<f64>,
}

/// Response from `GET /ledger/credits/available`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailableCredits {
    #[serde(default)]
    pub available_credits: Vec<CreditListing>,
    #[serde(default)]
    pub total_credits: f64,
}

/// Aggregate counters from `GET /ledger/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditTotals {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total_amount: f64,
}

/// Chain statistics from `GET /ledger/stats`.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerStats {
    pub blocks: u64,
    pub transactions: u64,
    pub verification_reports: u64,
    #[serde(default)]
    pub available_credits: CreditTotals,
    #[serde(default)]
    pub transferred_credits: CreditTotals,
}

#[derive(Debug, Clone, Deserialize)]
struct StatsResponse {
    blockchain_stats: LedgerStats,
}

impl ServiceClient {
    /// Persist an aggregated verification report to the ledger.
    pub async fn submit_report(
        &self,
        request: &SubmitRequest,
    ) -> Result<SubmitReceipt, ClientError> {
        let receipt: SubmitReceipt = self.ledger_post("/ledger/submit", request).await?;
        tracing::info!(
            report_id = %receipt.report_id,
            block = receipt.block_number,
            "verification report anchored to ledger"
        );
        Ok(receipt)
    }

    /// Issue carbon credits against a submitted report.
    pub async fn issue_credits(&self, request: &IssueRequest) -> Result<IssueReceipt, ClientError> {
        let receipt: IssueReceipt = self.ledger_post("/ledger/issue", request).await?;
        tracing::info!(
            credit_id = %receipt.credit_id,
            amount = receipt.amount,
            "carbon credits issued"
        );
        Ok(receipt)
    }

    /// Request a credit transfer from an NGO to a company.
    pub async fn transfer_credits(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, ClientError> {
        self.ledger_post("/ledger/transfer", request).await
    }

    /// Fetch a stored verification report by id.
    pub async fn query_report(&self, report_id: &str) -> Result<StoredReport, ClientError> {
        let url = self
            .endpoints()
            .url(ServiceKind::Ledger, &format!("/ledger/query/{report_id}"));
        let response: QueryResponse = self.ledger_get(&url).await?;
        Ok(response.report)
    }

    /// List credits currently available for purchase.
    pub async fn available_credits(&self) -> Result<AvailableCredits, ClientError> {
        let url = self
            .endpoints()
            .url(ServiceKind::Ledger, "/ledger/credits/available");
        self.ledger_get(&url).await
    }

    /// Fetch chain and trading statistics.
    pub async fn ledger_stats(&self) -> Result<LedgerStats, ClientError> {
        let url = self.endpoints().url(ServiceKind::Ledger, "/ledger/stats");
        let response: StatsResponse = self.ledger_get(&url).await?;
        Ok(response.blockchain_stats)
    }

    async fn ledger_post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize,
        R: serde::de::DeserializeOwned,
    {
        let url = self.endpoints().url(ServiceKind::Ledger, path);
        let response = self
            .http()
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse ledger response: {e}"))
        })
    }

    async fn ledger_get<R: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<R, ClientError> {
        let response = self
            .http()
            .get(url)
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse ledger response: {e}"))
        })
    }
}
