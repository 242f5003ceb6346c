//! Wire types for the Snowflake SQL API v2.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Record;

/// Body of `POST /api/v2/statements`.
#[derive(Debug, Serialize)]
pub struct StatementRequest<'a> {
    pub statement: &'a str,
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, Binding>,
}

/// A positional binding. Keys in [`StatementRequest::bindings`] are `"1"`, `"2"`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: BindingValue,
}

/// One value, or one value per row for a multi-row `INSERT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BindingValue {
    Single(String),
    Many(Vec<Option<String>>),
}

impl Binding {
    #[must_use]
    pub const fn text(value: String) -> Self {
        Self {
            kind: "TEXT",
            value: BindingValue::Single(value),
        }
    }

    #[must_use]
    pub const fn text_array(values: Vec<Option<String>>) -> Self {
        Self {
            kind: "TEXT",
            value: BindingValue::Many(values),
        }
    }
}

/// Number bindings `1..=n` in order.
pub fn positional(bindings: impl IntoIterator<Item = Binding>) -> BTreeMap<String, Binding> {
    bindings
        .into_iter()
        .enumerate()
        .map(|(index, binding)| ((index + 1).to_string(), binding))
        .collect()
}

/// Response to a submitted or polled statement.
///
/// Completed statements carry `resultSetMetaData` and `data`; statements still
/// running (HTTP 202) only carry the handle and a status message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sql_state: Option<String>,
    #[serde(default)]
    pub statement_handle: Option<String>,
    #[serde(default)]
    pub result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    pub data: Vec<Vec<Option<String>>>,
    #[serde(default)]
    pub stats: Option<Stats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetMetaData {
    #[serde(default)]
    pub num_rows: u64,
    #[serde(default)]
    pub row_type: Vec<ColumnType>,
    #[serde(default)]
    pub partition_info: Vec<PartitionInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ColumnType {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionInfo {
    #[serde(default)]
    pub row_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub num_rows_inserted: u64,
}

/// Body of `GET /api/v2/statements/{handle}?partition=N`.
#[derive(Debug, Deserialize)]
pub struct PartitionResponse {
    #[serde(default)]
    pub data: Vec<Vec<Option<String>>>,
}

impl StatementResponse {
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.result_set_meta_data
            .as_ref()
            .map(|meta| meta.row_type.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.result_set_meta_data
            .as_ref()
            .map_or(0, |meta| meta.partition_info.len())
    }

    /// Inserted row count of a DML statement: `stats.numRowsInserted`, falling
    /// back to the first result cell.
    #[must_use]
    pub fn rows_inserted(&self) -> Option<u64> {
        self.stats.as_ref().map(|s| s.num_rows_inserted).or_else(|| {
            self.data
                .first()
                .and_then(|row| row.first())
                .and_then(Option::as_deref)
                .and_then(|cell| cell.parse().ok())
        })
    }

    /// Turn the rows into [`Record`]s sharing one column list.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        let columns: Arc<[String]> = self.column_names().into();
        self.data
            .into_iter()
            .map(|values| Record::new(Arc::clone(&columns), values))
            .collect()
    }
}
