//! Upload and fixed-query configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_delimiter() -> String {
    String::from(",")
}

const fn default_verify_row_count() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Field delimiter of uploaded files. Must be a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Compare the warehouse-reported inserted row count with the parsed row
    /// count and report a verification failure on mismatch.
    #[serde(default = "default_verify_row_count")]
    pub verify_row_count: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            verify_row_count: default_verify_row_count(),
        }
    }
}

impl UploadConfig {
    /// The delimiter as a byte.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] unless the delimiter is exactly
    /// one ASCII character. `\t` is accepted as an escape for tab.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        parse_delimiter(&self.delimiter)
    }
}

/// Parse a user-supplied delimiter (config value or CLI flag).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] unless `value` is one ASCII character or `\t`.
pub fn parse_delimiter(value: &str) -> Result<u8, ConfigError> {
    if value == "\\t" {
        return Ok(b'\t');
    }
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(ConfigError::InvalidValue {
            field: "upload.delimiter",
            reason: format!("expected a single ASCII character, got {value:?}"),
        }),
    }
}

fn default_statement() -> String {
    String::from("SELECT * FROM sf_demo.sf_demo.emp_salary")
}

/// The fixed read query run by `hopper query`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    #[serde(default = "default_statement")]
    pub statement: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            statement: default_statement(),
        }
    }
}
