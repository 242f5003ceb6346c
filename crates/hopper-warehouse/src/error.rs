//! Warehouse error types.

/// Errors raised by a warehouse client. Messages carry the warehouse's own
/// text verbatim so callers can surface them unchanged.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// `DuckDB` operation failed.
    #[error("{0}")]
    DuckDb(#[from] duckdb::Error),

    /// HTTP transport error talking to the SQL API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The SQL API rejected the statement.
    #[error("{message} (status {status}, code {code})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Snowflake error code (e.g., `002003`), empty if absent.
        code: String,
        /// Error message from the response body.
        message: String,
    },

    /// A response could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A name cannot be used as an unquoted identifier.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The statement did not finish within the configured timeout.
    #[error("statement {handle} did not complete within {timeout_secs}s")]
    Timeout { handle: String, timeout_secs: u64 },

    /// The selected backend is missing required settings.
    #[error("warehouse not configured: {0}")]
    NotConfigured(String),
}
