//! # hopper-core
//!
//! Domain types shared across all Hopper crates:
//! - [`CatalogPath`], the `database.schema.table` destination of an upload
//! - [`TabularFile`], a parsed delimited file (columns + rows of raw values)
//! - [`FileUpload`], the raw bytes handed over by the file input
//! - [`UploadResult`] and [`UploadState`], the outcome and lifecycle of one attempt
//! - Cross-cutting error types

pub mod catalog_path;
pub mod errors;
pub mod tabular;
pub mod upload;

pub use catalog_path::CatalogPath;
pub use errors::CoreError;
pub use tabular::{FileUpload, RowView, TabularFile};
pub use upload::{FailureKind, UploadResult, UploadState};
