//! Cross-cutting error types for Hopper.
//!
//! Crate-specific errors (`WarehouseError`, `IngestError`, `ConfigError`) live
//! in their own crates. `hopper-cli` converges them through `anyhow`.

use thiserror::Error;

use crate::upload::UploadState;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An upload attempt tried to move between incompatible states.
    #[error("Invalid upload state transition from {from} to {to}")]
    InvalidTransition { from: UploadState, to: UploadState },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
