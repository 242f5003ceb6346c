//! The selection and upload sequence as explicit handlers.
//!
//! A caller picks a database, then a schema, then a table, and finally
//! submits a file. Each handler returns what the next picker needs. Changing
//! an earlier selection clears the later ones and drops their cached
//! listings, so the next listing reflects the warehouse as it is now.

use hopper_config::CatalogConfig;
use hopper_core::{CatalogPath, FileUpload, UploadResult, UploadState};
use hopper_warehouse::Warehouse;

use crate::appender::BulkAppender;
use crate::catalog::CatalogLister;
use crate::error::IngestError;
use crate::file_loader::{self, ParseOptions};

pub struct UploadController<'w, W> {
    lister: CatalogLister<'w, W>,
    catalog: CatalogConfig,
    parse_options: ParseOptions,
    verify_row_count: bool,
    database: Option<String>,
    schema: Option<String>,
    destination: Option<CatalogPath>,
    state: UploadState,
}

impl<'w, W: Warehouse> UploadController<'w, W> {
    pub fn new(warehouse: &'w W, catalog: &CatalogConfig) -> Self {
        Self {
            lister: CatalogLister::new(warehouse, catalog.cache_ttl()),
            catalog: catalog.clone(),
            parse_options: ParseOptions::default(),
            verify_row_count: true,
            database: None,
            schema: None,
            destination: None,
            state: UploadState::Idle,
        }
    }

    #[must_use]
    pub const fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    #[must_use]
    pub const fn with_verify_row_count(mut self, verify: bool) -> Self {
        self.verify_row_count = verify;
        self
    }

    pub const fn state(&self) -> UploadState {
        self.state
    }

    pub const fn destination(&self) -> Option<&CatalogPath> {
        self.destination.as_ref()
    }

    /// Databases offered for selection, minus `catalog.exclude_databases`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Warehouse`] if the listing fails.
    pub async fn databases(&mut self) -> Result<Vec<String>, IngestError> {
        let mut databases = self.lister.list_databases().await?;
        databases.retain(|db| !self.catalog.is_excluded(db));
        Ok(databases)
    }

    /// Select `database` and return its schemas.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotFound`] for an unknown or excluded database.
    /// The previous selection is kept on error.
    pub async fn select_database(&mut self, database: &str) -> Result<Vec<String>, IngestError> {
        if self.catalog.is_excluded(database) {
            return Err(IngestError::not_found("database", database));
        }
        let changed = self.database.as_deref() != Some(database);
        if changed {
            self.lister.cache().invalidate_database(database);
        }
        let schemas = self.lister.list_schemas(database).await?;
        if changed {
            tracing::debug!(database, "database selected");
            self.database = Some(database.to_string());
            self.schema = None;
            self.destination = None;
        }
        Ok(schemas)
    }

    /// Select `schema` in the current database and return its tables.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::SelectionOrder`] without a selected database,
    /// or [`IngestError::NotFound`] for an unknown schema.
    pub async fn select_schema(&mut self, schema: &str) -> Result<Vec<String>, IngestError> {
        let database = self
            .database
            .clone()
            .ok_or(IngestError::SelectionOrder("database"))?;
        let changed = self.schema.as_deref() != Some(schema);
        if changed {
            self.lister.cache().invalidate_schema(&database, schema);
        }
        let tables = self.lister.list_tables(&database, schema).await?;
        if changed {
            tracing::debug!(database, schema, "schema selected");
            self.schema = Some(schema.to_string());
            self.destination = None;
        }
        Ok(tables)
    }

    /// Select `table` and fix the upload destination.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::SelectionOrder`] without a selected database
    /// and schema, or [`IngestError::NotFound`] for an unknown table.
    pub async fn select_table(&mut self, table: &str) -> Result<CatalogPath, IngestError> {
        let database = self
            .database
            .clone()
            .ok_or(IngestError::SelectionOrder("database"))?;
        let schema = self
            .schema
            .clone()
            .ok_or(IngestError::SelectionOrder("schema"))?;
        let path = self.lister.resolve(&database, &schema, table).await?;
        tracing::debug!(destination = %path, "table selected");
        self.destination = Some(path.clone());
        Ok(path)
    }

    /// Prompt shown next to the file input.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::SelectionOrder`] until a table is selected.
    pub fn upload_label(&self) -> Result<String, IngestError> {
        let destination = self.require_destination()?;
        Ok(format!("Select file to ingest into {destination}"))
    }

    /// Run one upload attempt against the selected table.
    ///
    /// An absent or blank file, or one with only a header, is
    /// [`UploadResult::AwaitingInput`] and writes nothing. Write outcomes come
    /// back as values; parse failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::SelectionOrder`] without a selected table,
    /// [`IngestError::Parse`] if the file cannot be parsed, or
    /// [`IngestError::State`] on an illegal state move.
    pub async fn submit(&mut self, file: Option<FileUpload>) -> Result<UploadResult, IngestError> {
        self.reset();
        let destination = self.require_destination()?.clone();

        let Some(file) = file.filter(|f| !file_loader::is_empty(f)) else {
            return Ok(UploadResult::AwaitingInput);
        };
        self.advance(UploadState::FileReceived)?;
        tracing::info!(file = %file.name, bytes = file.bytes.len(), %destination, "file received");

        self.advance(UploadState::Parsing)?;
        let data = match file_loader::parse(&file, &self.parse_options) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "upload could not be parsed");
                self.advance(UploadState::Failed)?;
                return Err(err.into());
            }
        };
        if data.is_empty() {
            self.reset();
            return Ok(UploadResult::AwaitingInput);
        }

        self.advance(UploadState::Appending)?;
        let result = BulkAppender::new(self.lister.warehouse())
            .verify_row_count(self.verify_row_count)
            .append(&destination, Some(&data))
            .await;
        self.advance(if result.is_success() {
            UploadState::Succeeded
        } else {
            UploadState::Failed
        })?;
        Ok(result)
    }

    fn require_destination(&self) -> Result<&CatalogPath, IngestError> {
        if self.database.is_none() {
            return Err(IngestError::SelectionOrder("database"));
        }
        if self.schema.is_none() {
            return Err(IngestError::SelectionOrder("schema"));
        }
        self.destination
            .as_ref()
            .ok_or(IngestError::SelectionOrder("table"))
    }

    fn advance(&mut self, next: UploadState) -> Result<(), IngestError> {
        self.state = self.state.transition_to(next)?;
        Ok(())
    }

    /// Abandon the current attempt. Nothing has been written at this point.
    const fn reset(&mut self) {
        self.state = UploadState::Idle;
    }
}
