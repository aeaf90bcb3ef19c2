//! Fundamental types for the EcoLedger verification client.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! bounded scores, the verification input record, scoring parameters, and the
//! shared error type.

pub mod error;
pub mod input;
pub mod params;
pub mod score;

pub use error::TypeError;
pub use input::{EvidenceFile, IotPayload, VerificationInput};
pub use params::ScoringParams;
pub use score::Score;
