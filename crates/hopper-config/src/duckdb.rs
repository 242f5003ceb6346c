//! `DuckDB` warehouse configuration.

use serde::{Deserialize, Serialize};

/// Default database path.
fn default_path() -> String {
    String::from(":memory:")
}

/// An extra `DuckDB` file attached under `alias`.
///
/// Each attached database is listed as a warehouse database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttachConfig {
    pub alias: String,
    /// File path, or `:memory:` for a scratch database.
    pub path: String,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DuckDbConfig {
    /// Main database file, `:memory:` for an in-memory database.
    #[serde(default = "default_path")]
    pub path: String,

    /// Additional databases to attach after opening.
    #[serde(default)]
    pub attach: Vec<AttachConfig>,
}

impl Default for DuckDbConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            attach: Vec::new(),
        }
    }
}

impl DuckDbConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path.is_empty() || self.path == ":memory:"
    }
}
