//! Warehouse backend selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which warehouse client the process should build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local or in-memory `DuckDB`, attached databases act as warehouse databases.
    #[default]
    DuckDb,
    /// Snowflake through the SQL API v2.
    Snowflake,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DuckDb => "duckdb",
            Self::Snowflake => "snowflake",
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WarehouseConfig {
    #[serde(default)]
    pub backend: Backend,
}
