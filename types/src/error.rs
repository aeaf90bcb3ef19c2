//! Shared error type for domain-level validation.

use thiserror::Error;

/// Validation errors raised before any remote call is made.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("score {0} is outside the [0, 1] range")]
    ScoreOutOfRange(f64),

    #[error("score must be a finite number")]
    ScoreNotFinite,

    #[error("claimed tree count must be positive")]
    ClaimedTreesZero,

    #[error("tree evidence image is required")]
    MissingTreeImage,

    #[error("evidence file {0} is empty")]
    EmptyEvidenceFile(String),

    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    #[error("price per credit must be positive, got {0}")]
    InvalidPrice(f64),
}
