//! Snowflake backend over the SQL API v2.
//!
//! Statements are submitted with `POST /api/v2/statements`. A statement that
//! outlives the synchronous window comes back as HTTP 202 and is polled by
//! handle until it finishes or `timeout_secs` elapses. Large result sets are
//! split into partitions; partitions after the first are fetched one by one.

pub mod api;
mod http;

use std::time::{Duration, Instant};

use hopper_config::SnowflakeConfig;
use hopper_core::{CatalogPath, TabularFile};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use uuid::Uuid;

use self::api::{Binding, PartitionResponse, StatementRequest, StatementResponse, positional};
use self::http::{StatementStatus, read_statement};
use crate::{Dialect, Record, Warehouse, WarehouseError, ident};

const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// HTTP client for one Snowflake account.
pub struct SnowflakeWarehouse {
    http: reqwest::Client,
    config: SnowflakeConfig,
    base_url: String,
}

impl SnowflakeWarehouse {
    /// Build a client from configuration. No request is sent until the first
    /// statement.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::NotConfigured`] without an account or token,
    /// or [`WarehouseError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SnowflakeConfig) -> Result<Self, WarehouseError> {
        if !config.is_configured() {
            return Err(WarehouseError::NotConfigured(
                "snowflake.account and snowflake.token are required".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("hopper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs.saturating_add(30)))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
            base_url: config.base_url(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.config.token)
            .header(TOKEN_TYPE_HEADER, &self.config.token_type)
            .header(ACCEPT, "application/json")
    }

    fn statement_url(&self, handle: &str) -> String {
        format!(
            "{}/api/v2/statements/{}",
            self.base_url,
            urlencoding::encode(handle)
        )
    }

    /// Submit `sql`, wait for it to finish and collect every partition.
    async fn execute(
        &self,
        sql: &str,
        bindings: Vec<Binding>,
    ) -> Result<StatementResponse, WarehouseError> {
        let request_id = Uuid::new_v4();
        let request = StatementRequest {
            statement: sql,
            timeout: self.config.timeout_secs,
            warehouse: non_empty(&self.config.warehouse),
            role: non_empty(&self.config.role),
            bindings: positional(bindings),
        };
        tracing::debug!(%request_id, sql, user = %self.config.user, "submitting snowflake statement");

        let url = format!("{}/api/v2/statements?requestId={request_id}", self.base_url);
        let resp = self
            .authorized(self.http.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let mut response = match read_statement(resp).await? {
            StatementStatus::Done(response) => response,
            StatementStatus::Running(handle) => self.wait_for(&handle).await?,
        };
        self.fetch_remaining_partitions(&mut response).await?;
        Ok(response)
    }

    async fn wait_for(&self, handle: &str) -> Result<StatementResponse, WarehouseError> {
        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_secs);
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        loop {
            if Instant::now() >= deadline {
                return Err(WarehouseError::Timeout {
                    handle: handle.to_string(),
                    timeout_secs: self.config.timeout_secs,
                });
            }
            tokio::time::sleep(interval).await;
            tracing::debug!(handle, "polling snowflake statement");
            let resp = self
                .authorized(self.http.get(self.statement_url(handle)))
                .send()
                .await?;
            if let StatementStatus::Done(response) = read_statement(resp).await? {
                return Ok(response);
            }
        }
    }

    async fn fetch_remaining_partitions(
        &self,
        response: &mut StatementResponse,
    ) -> Result<(), WarehouseError> {
        let partitions = response.partition_count();
        if partitions <= 1 {
            return Ok(());
        }
        let handle = response.statement_handle.clone().ok_or_else(|| {
            WarehouseError::Protocol("partitioned result without statementHandle".to_string())
        })?;
        for partition in 1..partitions {
            let url = format!("{}?partition={partition}", self.statement_url(&handle));
            let resp = self.authorized(self.http.get(&url)).send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            if !status.is_success() {
                return Err(WarehouseError::Api {
                    status: status.as_u16(),
                    code: String::new(),
                    message: body,
                });
            }
            let page: PartitionResponse = serde_json::from_str(&body).map_err(|e| {
                WarehouseError::Protocol(format!("unreadable partition {partition}: {e}"))
            })?;
            response.data.extend(page.data);
        }
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// One array binding per column, each holding that column's value for every row.
fn column_bindings(data: &TabularFile) -> Vec<Binding> {
    (0..data.column_count())
        .map(|column| {
            Binding::text_array(
                data.rows()
                    .iter()
                    .map(|row| row.get(column).cloned().flatten())
                    .collect(),
            )
        })
        .collect()
}

impl Warehouse for SnowflakeWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Snowflake
    }

    async fn query(&self, sql: &str, params: &[String]) -> Result<Vec<Record>, WarehouseError> {
        let bindings = params.iter().cloned().map(Binding::text).collect();
        Ok(self.execute(sql, bindings).await?.into_records())
    }

    async fn append_rows(
        &self,
        destination: &CatalogPath,
        data: &TabularFile,
    ) -> Result<u64, WarehouseError> {
        if data.is_empty() {
            return Ok(0);
        }
        let sql = ident::insert_statement(
            destination,
            data.columns(),
            self.config.quote_identifiers,
        )?;
        tracing::debug!(%destination, rows = data.row_count(), "snowflake append");

        let response = self.execute(&sql, column_bindings(data)).await?;
        response.rows_inserted().ok_or_else(|| {
            WarehouseError::Protocol("insert response carried no row count".to_string())
        })
    }

    async fn count_rows(&self, destination: &CatalogPath) -> Result<u64, WarehouseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", ident::qualified(destination));
        let records = self.execute(&sql, Vec::new()).await?.into_records();
        records
            .first()
            .and_then(|record| record.value(0))
            .and_then(|cell| cell.parse().ok())
            .ok_or_else(|| WarehouseError::Protocol("COUNT(*) returned no number".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::api::BindingValue;
    use super::*;

    fn configured() -> SnowflakeConfig {
        SnowflakeConfig {
            account: "XY12345".into(),
            token: "secret".into(),
            ..SnowflakeConfig::default()
        }
    }

    #[test]
    fn new_requires_account_and_token() {
        let err = SnowflakeWarehouse::new(&SnowflakeConfig::default())
            .err()
            .expect("should fail");
        assert!(matches!(err, WarehouseError::NotConfigured(_)));
    }

    #[test]
    fn statement_url_encodes_handle() {
        let warehouse = SnowflakeWarehouse::new(&configured()).expect("client");
        assert_eq!(warehouse.dialect(), Dialect::Snowflake);
        assert_eq!(
            warehouse.statement_url("01b2/x"),
            "https://xy12345.snowflakecomputing.com/api/v2/statements/01b2%2Fx"
        );
    }

    #[test]
    fn column_bindings_transpose_rows() {
        let data = TabularFile::new(
            vec!["NAME".into(), "SALARY".into()],
            vec![
                vec![Some("ada".into()), Some("100".into())],
                vec![Some("bob".into()), None],
            ],
        )
        .expect("table");

        let bindings = column_bindings(&data);
        assert_eq!(bindings.len(), 2);
        assert_eq!(
            bindings[0].value,
            BindingValue::Many(vec![Some("ada".into()), Some("bob".into())])
        );
        assert_eq!(
            bindings[1].value,
            BindingValue::Many(vec![Some("100".into()), None])
        );
    }

    #[tokio::test]
    async fn unquoted_columns_must_be_plain_identifiers() {
        let warehouse = SnowflakeWarehouse::new(&configured()).expect("client");
        let data = TabularFile::new(vec!["first name".into()], vec![vec![Some("ada".into())]])
            .expect("table");
        let err = warehouse
            .append_rows(&CatalogPath::new("D", "S", "T"), &data)
            .await
            .unwrap_err();
        assert!(matches!(err, WarehouseError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn empty_append_sends_nothing() {
        let warehouse = SnowflakeWarehouse::new(&configured()).expect("client");
        let data = TabularFile::new(vec!["NAME".into()], Vec::new()).expect("table");
        let inserted = warehouse
            .append_rows(&CatalogPath::new("D", "S", "T"), &data)
            .await
            .expect("no-op");
        assert_eq!(inserted, 0);
    }
}
