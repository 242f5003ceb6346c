//! # hopper-config
//!
//! Layered configuration loading for Hopper using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`HOPPER_*` prefix, `__` as separator)
//! 2. Project-level `.hopper/config.toml`
//! 3. User-level `~/.config/hopper/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `HOPPER_SNOWFLAKE__ACCOUNT` -> `snowflake.account`,
//! `HOPPER_WAREHOUSE__BACKEND` -> `warehouse.backend`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use hopper_config::HopperConfig;
//!
//! let config = HopperConfig::load_with_dotenv().expect("config");
//! if config.snowflake.is_configured() {
//!     println!("Snowflake API: {}", config.snowflake.base_url());
//! }
//! ```

mod catalog;
mod duckdb;
mod error;
mod snowflake;
mod upload;
mod warehouse;

pub use catalog::CatalogConfig;
pub use duckdb::{AttachConfig, DuckDbConfig};
pub use error::ConfigError;
pub use snowflake::SnowflakeConfig;
pub use upload::{QueryConfig, UploadConfig, parse_delimiter};
pub use warehouse::{Backend, WarehouseConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project-local configuration directory.
pub const PROJECT_DIR: &str = ".hopper";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HopperConfig {
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub duckdb: DuckDbConfig,
    #[serde(default)]
    pub snowflake: SnowflakeConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl HopperConfig {
    /// Load configuration from all sources, relative to the current directory.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be read or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration for the project rooted at `project_root`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        Self::figment_for(project_root)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for `project_root`.
    #[must_use]
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("HOPPER_").split("__"))
    }

    /// Check that the selected backend has what it needs to connect and that
    /// upload settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSettings`] when the Snowflake backend is
    /// selected without account/token, or [`ConfigError::InvalidValue`] for a
    /// bad delimiter or an attachment without an alias.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.warehouse.backend {
            Backend::Snowflake if !self.snowflake.is_configured() => {
                return Err(ConfigError::MissingSettings {
                    section: "snowflake",
                    missing: self.snowflake.missing_fields(),
                });
            }
            Backend::DuckDb => {
                if let Some(attach) = self.duckdb.attach.iter().find(|a| a.alias.is_empty()) {
                    return Err(ConfigError::InvalidValue {
                        field: "duckdb.attach.alias",
                        reason: format!("attachment of '{}' has an empty alias", attach.path),
                    });
                }
            }
            Backend::Snowflake => {}
        }
        self.upload.delimiter_byte()?;
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hopper").join("config.toml"))
    }
}
