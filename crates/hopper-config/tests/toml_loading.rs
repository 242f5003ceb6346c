//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use hopper_config::{AttachConfig, Backend, HopperConfig};
use pretty_assertions::assert_eq;

#[test]
fn loads_snowflake_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[warehouse]
backend = "snowflake"

[snowflake]
account = "xy12345.us-east-1"
user = "LOADER"
token = "oauth-token"
role = "SYSADMIN"
warehouse = "COMPUTE_WH"
timeout_secs = 120
quote_identifiers = true
"#,
        )?;

        let config: HopperConfig = Figment::from(Serialized::defaults(HopperConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.warehouse.backend, Backend::Snowflake);
        assert_eq!(config.snowflake.account, "xy12345.us-east-1");
        assert_eq!(config.snowflake.user, "LOADER");
        assert_eq!(config.snowflake.role, "SYSADMIN");
        assert_eq!(config.snowflake.warehouse, "COMPUTE_WH");
        assert_eq!(config.snowflake.timeout_secs, 120);
        assert_eq!(config.snowflake.token_type, "OAUTH");
        assert_eq!(config.snowflake.poll_interval_ms, 500);
        assert!(config.snowflake.quote_identifiers);
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn loads_duckdb_attachments_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[duckdb]
path = "main.duckdb"

[[duckdb.attach]]
alias = "ANALYTICS"
path = "analytics.duckdb"

[[duckdb.attach]]
alias = "SCRATCH"
path = ":memory:"
read_only = false
"#,
        )?;

        let config: HopperConfig = Figment::from(Serialized::defaults(HopperConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.warehouse.backend, Backend::DuckDb);
        assert_eq!(config.duckdb.path, "main.duckdb");
        assert_eq!(
            config.duckdb.attach,
            vec![
                AttachConfig {
                    alias: "ANALYTICS".into(),
                    path: "analytics.duckdb".into(),
                    read_only: false,
                },
                AttachConfig {
                    alias: "SCRATCH".into(),
                    path: ":memory:".into(),
                    read_only: false,
                },
            ]
        );
        Ok(())
    });
}

#[test]
fn project_config_is_read_from_hopper_dir() {
    Jail::expect_with(|jail| {
        jail.create_dir(".hopper")?;
        jail.create_file(
            ".hopper/config.toml",
            r#"
[catalog]
cache_ttl_secs = 30
exclude_databases = ["SNOWFLAKE"]

[upload]
delimiter = ";"
verify_row_count = false

[query]
statement = "SELECT 1"
"#,
        )?;

        let config = HopperConfig::load_from(jail.directory()).expect("config loads");
        assert_eq!(config.catalog.cache_ttl_secs, 30);
        assert!(config.catalog.is_excluded("snowflake"));
        assert_eq!(config.upload.delimiter, ";");
        assert!(!config.upload.verify_row_count);
        assert_eq!(config.query.statement, "SELECT 1");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[snowflake]
account = "from-toml"
"#,
        )?;
        jail.set_env("HOPPER_SNOWFLAKE__ACCOUNT", "from-env");
        jail.set_env("HOPPER_WAREHOUSE__BACKEND", "snowflake");

        let config: HopperConfig = Figment::from(Serialized::defaults(HopperConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("HOPPER_").split("__"))
            .extract()?;

        assert_eq!(config.snowflake.account, "from-env");
        assert_eq!(config.warehouse.backend, Backend::Snowflake);
        Ok(())
    });
}

#[test]
fn unknown_backend_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[warehouse]
backend = "oracle"
"#,
        )?;

        let result: Result<HopperConfig, _> =
            Figment::from(Serialized::defaults(HopperConfig::default()))
                .merge(Toml::file("config.toml"))
                .extract();
        assert!(result.is_err());
        Ok(())
    });
}
