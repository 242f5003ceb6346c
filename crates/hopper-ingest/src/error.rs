//! Ingest error types.

use hopper_core::{CoreError, FailureKind, UploadResult};
use hopper_warehouse::WarehouseError;
use thiserror::Error;

/// Why an uploaded file could not be turned into rows.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("the file has no header row")]
    MissingHeader,

    #[error("header column {position} has no name")]
    EmptyHeader { position: usize },

    #[error("header name {0:?} appears more than once")]
    DuplicateHeader(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount { line: u64, expected: u64, found: u64 },

    #[error("line {line}: invalid UTF-8")]
    InvalidUtf8 { line: u64 },

    #[error("could not decompress {name}: {source}")]
    Gzip {
        name: String,
        source: std::io::Error,
    },

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Shape(#[from] CoreError),
}

/// Errors surfaced by the catalog and upload flow.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A catalog object is not among the current listing.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("could not parse the file: {0}")]
    Parse(#[from] ParseError),

    /// A handler was called before the selection it depends on.
    #[error("select a {0} first")]
    SelectionOrder(&'static str),

    /// A catalog listing query failed.
    #[error("catalog query failed: {0}")]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    State(#[from] CoreError),
}

impl IngestError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl From<&IngestError> for UploadResult {
    fn from(err: &IngestError) -> Self {
        let kind = match err {
            IngestError::NotFound { .. } | IngestError::SelectionOrder(_) => FailureKind::NotFound,
            IngestError::Parse(_) => FailureKind::Parse,
            IngestError::Warehouse(_) | IngestError::State(_) => FailureKind::Write,
        };
        Self::failure(kind, err.to_string())
    }
}
