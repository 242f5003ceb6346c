//! Append-only bulk write of a parsed file.

use hopper_core::{CatalogPath, FailureKind, TabularFile, UploadResult};
use hopper_warehouse::Warehouse;

/// Writes a [`TabularFile`] to a destination table and reports the outcome as
/// an [`UploadResult`]. Never overwrites and never retries.
pub struct BulkAppender<'w, W> {
    warehouse: &'w W,
    verify_row_count: bool,
}

impl<'w, W: Warehouse> BulkAppender<'w, W> {
    pub const fn new(warehouse: &'w W) -> Self {
        Self {
            warehouse,
            verify_row_count: true,
        }
    }

    /// Compare the warehouse-reported insert count with the parsed row count.
    #[must_use]
    pub const fn verify_row_count(mut self, verify: bool) -> Self {
        self.verify_row_count = verify;
        self
    }

    /// Append `data` to `destination`.
    ///
    /// `None` or a file without data rows yields
    /// [`UploadResult::AwaitingInput`] and touches nothing. Warehouse errors
    /// come back as a [`FailureKind::Write`] failure carrying the warehouse's
    /// message.
    pub async fn append(
        &self,
        destination: &CatalogPath,
        data: Option<&TabularFile>,
    ) -> UploadResult {
        let Some(data) = data.filter(|d| !d.is_empty()) else {
            return UploadResult::AwaitingInput;
        };
        let expected = data.row_count() as u64;
        tracing::info!(%destination, rows = expected, columns = data.column_count(), "appending upload");

        match self.warehouse.append_rows(destination, data).await {
            Ok(inserted) if self.verify_row_count && inserted != expected => {
                tracing::warn!(%destination, expected, inserted, "inserted row count mismatch");
                UploadResult::failure(
                    FailureKind::Verification,
                    format!("{destination} reported {inserted} inserted rows, expected {expected}."),
                )
            }
            Ok(_) => {
                tracing::info!(%destination, rows = expected, "upload appended");
                UploadResult::Success {
                    rows_written: expected,
                }
            }
            Err(err) => {
                tracing::warn!(%destination, error = %err, "upload failed");
                UploadResult::failure(FailureKind::Write, err.to_string())
            }
        }
    }
}
