//! Client error taxonomy and the single message-normalization routine.
//!
//! Three error classes reach the user: transport failures (timeout,
//! connection refused), server-reported business errors (non-2xx with a
//! message payload), and client-side validation failures caught before any
//! call is made. All three collapse to one human-readable string.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Timeout or connection failure before a response arrived.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// Non-2xx response; the message is extracted from the body when present.
    #[error("{0}")]
    Service(String),

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client-side validation failure, raised before any network call.
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// Map a transport-level `reqwest` error onto the taxonomy.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ClientError::Unreachable(format!("connection failed: {e}"))
        } else {
            ClientError::Service(e.to_string())
        }
    }
}

/// Error payload shape shared by every EcoLedger service:
/// `{"error": "...", "message": "..."}`, either field optional.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Fallback string when a failure carries no usable message at all.
pub const GENERIC_FAILURE: &str = "verification service request failed";

/// Extract the surfaced message for a non-2xx response.
///
/// Priority order: server-supplied `message` field, server `error` field,
/// the HTTP status line, then a generic fallback.
pub(crate) fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
        if let Some(error) = parsed.error.filter(|e| !e.trim().is_empty()) {
            return error;
        }
    }
    format!("{GENERIC_FAILURE}: HTTP {status}")
}

/// Turn a response into `Ok(response)` or the normalized service error.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Service(extract_error_message(status, &body)))
}
