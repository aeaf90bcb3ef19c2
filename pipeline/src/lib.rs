//! The EcoLedger verification pipeline.
//!
//! Sequences the six backend services into one verification run: tree
//! detection, NDVI, IoT scoring, CO2 estimation, final scoring, and the
//! ledger submission with conditional credit issuance. The services sit
//! behind the [`VerificationServices`] trait so runs can be driven against
//! real HTTP endpoints or the deterministic [`NullServices`] double.

pub mod error;
pub mod null;
pub mod orchestrator;
pub mod report;
pub mod services;

pub use error::{PipelineError, PipelineStage};
pub use null::{NullServices, RecordedCall};
pub use orchestrator::{Orchestrator, RunEvent};
pub use report::{PartialReport, VerificationReport};
pub use services::{HttpServices, VerificationServices};
