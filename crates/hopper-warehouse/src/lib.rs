//! # hopper-warehouse
//!
//! The warehouse collaborator behind Hopper's catalog listing and bulk append.
//!
//! A [`Warehouse`] runs read queries (rows come back as [`Record`]s) and
//! appends a [`TabularFile`] to a `database.schema.table`. Two backends:
//!
//! - [`DuckWarehouse`]: local `DuckDB`; attached databases act as warehouse
//!   databases. Used by the test suites and for offline work.
//! - [`SnowflakeWarehouse`]: Snowflake through the SQL API v2.
//!
//! [`WarehouseClient`] picks one from configuration. The process entry point
//! owns the client and passes it explicitly to the catalog and upload layers.

pub mod duck;
pub mod error;
pub mod ident;
pub mod snowflake;

pub use duck::DuckWarehouse;
pub use error::WarehouseError;
pub use snowflake::SnowflakeWarehouse;

use std::sync::Arc;

use hopper_config::{Backend, HopperConfig};
use hopper_core::{CatalogPath, TabularFile};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// SQL dialect spoken by a warehouse; selects the catalog queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    DuckDb,
    Snowflake,
}

/// One result row: column names plus nullable text values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Record {
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Value of the first column named `name` (ASCII case-insensitive).
    /// `None` if the column is missing or the value is null.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
            .and_then(|index| self.value(index))
    }

    /// Value at position `index`, `None` if out of range or null.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(Option::as_deref)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Operations Hopper needs from a warehouse.
///
/// Implementations must make [`Warehouse::append_rows`] all-or-nothing for a
/// single call and must never delete or overwrite existing rows.
#[allow(async_fn_in_trait)]
pub trait Warehouse {
    fn dialect(&self) -> Dialect;

    /// Run a read query. `params` bind positional `?` placeholders as text.
    async fn query(&self, sql: &str, params: &[String]) -> Result<Vec<Record>, WarehouseError>;

    /// Append every row of `data` to `destination`, matching columns by name.
    /// Returns the number of rows the warehouse reports as inserted.
    async fn append_rows(
        &self,
        destination: &CatalogPath,
        data: &TabularFile,
    ) -> Result<u64, WarehouseError>;

    /// Current number of rows in `destination`.
    async fn count_rows(&self, destination: &CatalogPath) -> Result<u64, WarehouseError>;
}

/// The configured warehouse backend.
pub enum WarehouseClient {
    DuckDb(DuckWarehouse),
    Snowflake(SnowflakeWarehouse),
}

impl WarehouseClient {
    /// Build the client selected by `config.warehouse.backend`.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::NotConfigured`] if the Snowflake backend lacks
    /// credentials, or the backend's own error if opening fails.
    pub fn connect(config: &HopperConfig) -> Result<Self, WarehouseError> {
        match config.warehouse.backend {
            Backend::DuckDb => DuckWarehouse::open(&config.duckdb).map(Self::DuckDb),
            Backend::Snowflake => SnowflakeWarehouse::new(&config.snowflake).map(Self::Snowflake),
        }
    }
}

impl Warehouse for WarehouseClient {
    fn dialect(&self) -> Dialect {
        match self {
            Self::DuckDb(inner) => inner.dialect(),
            Self::Snowflake(inner) => inner.dialect(),
        }
    }

    async fn query(&self, sql: &str, params: &[String]) -> Result<Vec<Record>, WarehouseError> {
        match self {
            Self::DuckDb(inner) => inner.query(sql, params).await,
            Self::Snowflake(inner) => inner.query(sql, params).await,
        }
    }

    async fn append_rows(
        &self,
        destination: &CatalogPath,
        data: &TabularFile,
    ) -> Result<u64, WarehouseError> {
        match self {
            Self::DuckDb(inner) => inner.append_rows(destination, data).await,
            Self::Snowflake(inner) => inner.append_rows(destination, data).await,
        }
    }

    async fn count_rows(&self, destination: &CatalogPath) -> Result<u64, WarehouseError> {
        match self {
            Self::DuckDb(inner) => inner.count_rows(destination).await,
            Self::Snowflake(inner) => inner.count_rows(destination).await,
        }
    }
}
