//! In-process TTL cache for catalog listings.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

/// What a cached listing describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Databases,
    Schemas(String),
    Tables(String, String),
}

impl CacheKey {
    fn belongs_to(&self, database: &str) -> bool {
        match self {
            Self::Databases => false,
            Self::Schemas(db) | Self::Tables(db, _) => db == database,
        }
    }
}

/// Listings keyed by [`CacheKey`]. Entries expire `ttl` after insertion;
/// a zero `ttl` disables caching.
pub struct CatalogCache {
    entries: Cache<CacheKey, Arc<[String]>>,
    ttl: Duration,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let mut builder = Cache::builder();
        if !ttl.is_zero() {
            tracing::debug!(?ttl, "catalog cache enabled");
            builder = builder.time_to_live(ttl);
        }
        Self {
            entries: builder.build(),
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached names for `key`, `None` if absent or expired.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Vec<String>> {
        self.entries.get(key).map(|names| names.to_vec())
    }

    pub fn put(&self, key: CacheKey, names: &[String]) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(key, Arc::from(names));
    }

    /// Drop the schema listing of `database` and every table listing under it.
    pub fn invalidate_database(&self, database: &str) {
        let keys = self
            .entries
            .iter()
            .filter(|(key, _)| key.belongs_to(database))
            .map(|(key, _)| key)
            .collect::<Vec<_>>();
        for key in keys {
            self.entries.invalidate(key.as_ref());
        }
    }

    /// Drop the table listing of `database.schema`.
    pub fn invalidate_schema(&self, database: &str, schema: &str) {
        self.entries
            .invalidate(&CacheKey::Tables(database.to_string(), schema.to_string()));
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().next().is_none()
    }
}
