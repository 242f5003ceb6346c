//! Catalog listing: databases, then schemas, then base tables.
//!
//! Every listing is one read query against the warehouse, answered from the
//! [`CatalogCache`] while fresh. Schemas and tables are validated against the
//! parent listing, so a name the user could not have picked is `NotFound`.

use std::time::Duration;

use hopper_core::CatalogPath;
use hopper_warehouse::{Dialect, Warehouse, ident};

use crate::cache::{CacheKey, CatalogCache};
use crate::error::IngestError;

const INFORMATION_SCHEMA: &str = "INFORMATION_SCHEMA";

pub struct CatalogLister<'w, W> {
    warehouse: &'w W,
    cache: CatalogCache,
}

impl<'w, W: Warehouse> CatalogLister<'w, W> {
    pub fn new(warehouse: &'w W, ttl: Duration) -> Self {
        Self {
            warehouse,
            cache: CatalogCache::new(ttl),
        }
    }

    pub const fn warehouse(&self) -> &'w W {
        self.warehouse
    }

    pub const fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Every database visible to the connection.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Warehouse`] if the listing query fails.
    pub async fn list_databases(&mut self) -> Result<Vec<String>, IngestError> {
        let sql = match self.warehouse.dialect() {
            Dialect::DuckDb => {
                "SELECT database_name FROM duckdb_databases() WHERE NOT internal ORDER BY database_name"
                    .to_string()
            }
            Dialect::Snowflake => "SHOW DATABASES".to_string(),
        };
        self.cached(CacheKey::Databases, &sql, &[], "name").await
    }

    /// Schemas of `database` holding at least one base table, without
    /// `INFORMATION_SCHEMA`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotFound`] if `database` is not listed, or
    /// [`IngestError::Warehouse`] if a query fails.
    pub async fn list_schemas(&mut self, database: &str) -> Result<Vec<String>, IngestError> {
        if !self.list_databases().await?.iter().any(|db| db == database) {
            return Err(IngestError::not_found("database", database));
        }
        let (sql, params) = match self.warehouse.dialect() {
            Dialect::DuckDb => (
                "SELECT DISTINCT table_schema FROM information_schema.tables \
                 WHERE table_catalog = ? AND table_type = 'BASE TABLE' \
                 AND upper(table_schema) <> 'INFORMATION_SCHEMA' \
                 ORDER BY table_schema"
                    .to_string(),
                vec![database.to_string()],
            ),
            Dialect::Snowflake => (
                format!(
                    "SELECT DISTINCT TABLE_SCHEMA FROM {}.INFORMATION_SCHEMA.TABLES \
                     WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_SCHEMA <> 'INFORMATION_SCHEMA' \
                     ORDER BY TABLE_SCHEMA",
                    ident::quote(database)
                ),
                Vec::new(),
            ),
        };
        let mut schemas = self
            .cached(CacheKey::Schemas(database.to_string()), &sql, &params, "table_schema")
            .await?;
        schemas.retain(|schema| !schema.eq_ignore_ascii_case(INFORMATION_SCHEMA));
        Ok(schemas)
    }

    /// Base tables (no views) of `database.schema`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotFound`] if `database` or `schema` is not
    /// listed, or [`IngestError::Warehouse`] if a query fails.
    pub async fn list_tables(
        &mut self,
        database: &str,
        schema: &str,
    ) -> Result<Vec<String>, IngestError> {
        if !self.list_schemas(database).await?.iter().any(|s| s == schema) {
            return Err(IngestError::not_found(
                "schema",
                format!("{database}.{schema}"),
            ));
        }
        let (sql, params) = match self.warehouse.dialect() {
            Dialect::DuckDb => (
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_catalog = ? AND table_schema = ? AND table_type = 'BASE TABLE' \
                 ORDER BY table_name"
                    .to_string(),
                vec![database.to_string(), schema.to_string()],
            ),
            Dialect::Snowflake => (
                format!(
                    "SELECT TABLE_NAME FROM {}.INFORMATION_SCHEMA.TABLES \
                     WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' \
                     ORDER BY TABLE_NAME",
                    ident::quote(database)
                ),
                vec![schema.to_string()],
            ),
        };
        self.cached(
            CacheKey::Tables(database.to_string(), schema.to_string()),
            &sql,
            &params,
            "table_name",
        )
        .await
    }

    /// Build a destination from listed names only.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotFound`] for any name that is not listed.
    pub async fn resolve(
        &mut self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<CatalogPath, IngestError> {
        if !self.list_tables(database, schema).await?.iter().any(|t| t == table) {
            return Err(IngestError::not_found(
                "table",
                format!("{database}.{schema}.{table}"),
            ));
        }
        Ok(CatalogPath::new(database, schema, table))
    }

    async fn cached(
        &mut self,
        key: CacheKey,
        sql: &str,
        params: &[String],
        column: &str,
    ) -> Result<Vec<String>, IngestError> {
        if let Some(names) = self.cache.get(&key) {
            return Ok(names);
        }
        let records = self.warehouse.query(sql, params).await?;
        let mut names: Vec<String> = records
            .iter()
            .filter_map(|record| record.get(column).or_else(|| record.value(0)))
            .map(ToString::to_string)
            .collect();
        names.sort();
        names.dedup();
        tracing::debug!(?key, count = names.len(), "catalog listing fetched");
        self.cache.put(key, &names);
        Ok(names)
    }
}
