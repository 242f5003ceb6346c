//! # hopper-ingest
//!
//! The upload workflow on top of a [`hopper_warehouse::Warehouse`]:
//!
//! - [`catalog`]: list databases, schemas and base tables, cached with a TTL
//! - [`file_loader`]: parse an uploaded CSV into a [`hopper_core::TabularFile`]
//! - [`appender`]: append-only write of a parsed file, reported as an
//!   [`hopper_core::UploadResult`]
//! - [`controller`]: the selection and upload sequence as explicit handlers

pub mod appender;
pub mod cache;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod file_loader;

pub use appender::BulkAppender;
pub use cache::{CacheKey, CatalogCache};
pub use catalog::CatalogLister;
pub use controller::UploadController;
pub use error::{IngestError, ParseError};
pub use file_loader::ParseOptions;
