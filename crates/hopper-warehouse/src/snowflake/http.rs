//! Response classification for the SQL API.
//!
//! 200 is a finished statement, 202 a statement still running (poll its
//! handle), anything else an error whose body carries Snowflake's `code` and
//! `message`.

use reqwest::StatusCode;

use super::api::StatementResponse;
use crate::WarehouseError;

/// Outcome of one submit or status request.
#[derive(Debug)]
pub enum StatementStatus {
    Done(StatementResponse),
    Running(String),
}

pub async fn read_statement(resp: reqwest::Response) -> Result<StatementStatus, WarehouseError> {
    let status = resp.status();
    let body = resp.text().await?;

    if status == StatusCode::ACCEPTED {
        let response = parse(&body)?;
        let handle = response.statement_handle.ok_or_else(|| {
            WarehouseError::Protocol("202 response without statementHandle".to_string())
        })?;
        return Ok(StatementStatus::Running(handle));
    }
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    parse(&body).map(StatementStatus::Done)
}

fn parse(body: &str) -> Result<StatementResponse, WarehouseError> {
    serde_json::from_str(body)
        .map_err(|e| WarehouseError::Protocol(format!("unreadable statement response: {e}")))
}

fn api_error(status: StatusCode, body: &str) -> WarehouseError {
    let parsed = serde_json::from_str::<StatementResponse>(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|r| r.code.clone())
        .unwrap_or_default();
    let message = parsed
        .and_then(|r| r.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    WarehouseError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}
