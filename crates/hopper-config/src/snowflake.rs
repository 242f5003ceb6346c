//! Snowflake SQL API configuration.

use serde::{Deserialize, Serialize};

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_poll_interval_ms() -> u64 {
    500
}

fn default_token_type() -> String {
    String::from("OAUTH")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnowflakeConfig {
    /// Account identifier (e.g., `xy12345.us-east-1` or `myorg-myaccount`).
    #[serde(default)]
    pub account: String,

    /// Host override. If empty, built from `account`.
    #[serde(default)]
    pub host: String,

    /// Login name, sent for logging only; the token carries the identity.
    #[serde(default)]
    pub user: String,

    /// Bearer token for the SQL API.
    #[serde(default)]
    pub token: String,

    /// Value of `X-Snowflake-Authorization-Token-Type`:
    /// `OAUTH`, `KEYPAIR_JWT` or `PROGRAMMATIC_ACCESS_TOKEN`.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    #[serde(default)]
    pub role: String,

    /// Compute warehouse that runs the statements.
    #[serde(default)]
    pub warehouse: String,

    /// Statement timeout, also the upper bound for polling async statements.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between status polls of an asynchronous statement.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Quote identifiers in generated SQL. When false, names are emitted bare
    /// and Snowflake resolves them case-insensitively.
    #[serde(default)]
    pub quote_identifiers: bool,
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            host: String::new(),
            user: String::new(),
            token: String::new(),
            token_type: default_token_type(),
            role: String::new(),
            warehouse: String::new(),
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            quote_identifiers: false,
        }
    }
}

impl SnowflakeConfig {
    /// Check if the Snowflake config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Required fields that are still empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [("account", &self.account), ("token", &self.token)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Base URL of the SQL API, without a trailing slash.
    ///
    /// Uses `host` if set, otherwise `https://{account}.snowflakecomputing.com`.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.is_empty() {
            format!("https://{}.snowflakecomputing.com", self.account.to_lowercase())
        } else if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.host.trim_end_matches('/'))
        }
    }
}
