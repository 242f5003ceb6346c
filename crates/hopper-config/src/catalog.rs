//! Catalog listing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_cache_ttl_secs() -> u64 {
    600
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// How long a cached listing stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Databases hidden from the database picker (e.g., `SNOWFLAKE`).
    /// Compared case-insensitively.
    #[serde(default)]
    pub exclude_databases: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            exclude_databases: Vec::new(),
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    #[must_use]
    pub fn is_excluded(&self, database: &str) -> bool {
        self.exclude_databases
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(database))
    }
}
