//! `DuckDB` warehouse backend.
//!
//! The main database plus every `ATTACH`ed database show up as warehouse
//! databases; their `information_schema` provides the catalog. Appends run as
//! parameterized `INSERT`s inside one transaction, so a failing row rolls the
//! whole file back.

use std::sync::Arc;

use duckdb::types::{TimeUnit, Value};
use duckdb::{Connection, params_from_iter};
use hopper_config::{AttachConfig, DuckDbConfig};
use hopper_core::{CatalogPath, TabularFile};
use tokio::sync::Mutex;

use crate::{Dialect, Record, Warehouse, WarehouseError, ident};

/// Warehouse over a single `DuckDB` connection.
pub struct DuckWarehouse {
    conn: Mutex<Connection>,
}

impl DuckWarehouse {
    /// Open the configured database and attach the extra ones.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::DuckDb`] if the file cannot be opened or an
    /// `ATTACH` fails.
    pub fn open(config: &DuckDbConfig) -> Result<Self, WarehouseError> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };
        for attach in &config.attach {
            tracing::debug!(alias = %attach.alias, path = %attach.path, "attaching duckdb database");
            conn.execute_batch(&attach_statement(attach))?;
        }
        Ok(Self::from_connection(conn))
    }

    /// Open an empty in-memory warehouse (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::DuckDb`] if `DuckDB` fails to start.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run one or more statements without results (DDL, seeding).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::DuckDb`] on the first failing statement.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), WarehouseError> {
        self.conn.lock().await.execute_batch(sql)?;
        Ok(())
    }
}

fn attach_statement(attach: &AttachConfig) -> String {
    let mut sql = format!(
        "ATTACH {} AS {}",
        ident::literal(&attach.path),
        ident::quote(&attach.alias)
    );
    if attach.read_only {
        sql.push_str(" (READ_ONLY)");
    }
    sql
}

impl Warehouse for DuckWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    async fn query(&self, sql: &str, params: &[String]) -> Result<Vec<Record>, WarehouseError> {
        tracing::debug!(sql, ?params, "duckdb query");
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let columns: Arc<[String]> = rows
            .as_ref()
            .map(duckdb::Statement::column_names)
            .unwrap_or_default()
            .into();

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                values.push(value_to_text(row.get::<_, Value>(index)?));
            }
            records.push(Record::new(Arc::clone(&columns), values));
        }
        Ok(records)
    }

    async fn append_rows(
        &self,
        destination: &CatalogPath,
        data: &TabularFile,
    ) -> Result<u64, WarehouseError> {
        let sql = ident::insert_statement(destination, data.columns(), true)?;
        tracing::debug!(%destination, rows = data.row_count(), sql, "duckdb append");

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let mut inserted = 0_u64;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in data.iter_rows() {
                let values = row.iter().map(|(_, value)| value);
                inserted += stmt.execute(params_from_iter(values))? as u64;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    async fn count_rows(&self, destination: &CatalogPath) -> Result<u64, WarehouseError> {
        let sql = format!("SELECT count(*) FROM {}", ident::qualified(destination));
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| WarehouseError::Protocol(format!("negative count {count}")))
    }
}

/// Days from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Render a `DuckDB` value as text the way it would print in a result grid.
fn value_to_text(value: Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::Text(v) | Value::Enum(v) => v,
        Value::Boolean(v) => v.to_string(),
        Value::TinyInt(v) => v.to_string(),
        Value::SmallInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::HugeInt(v) => v.to_string(),
        Value::UTinyInt(v) => v.to_string(),
        Value::USmallInt(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::UBigInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Decimal(v) => v.to_string(),
        Value::Date32(i32::MAX) | Value::Timestamp(_, i64::MAX) => String::from("infinity"),
        Value::Date32(days) if days == -i32::MAX => String::from("-infinity"),
        Value::Timestamp(_, raw) if raw == -i64::MAX => String::from("-infinity"),
        Value::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(chrono::NaiveDate::from_num_days_from_ce_opt)
            .map_or_else(|| days.to_string(), |date| date.to_string()),
        Value::Timestamp(unit, raw) => chrono::DateTime::from_timestamp_micros(to_micros(unit, raw))
            .map_or_else(
                || raw.to_string(),
                |ts| ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            ),
        other => format!("{other:?}"),
    };
    Some(text)
}

const fn to_micros(unit: TimeUnit, raw: i64) -> i64 {
    match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn seeded() -> DuckWarehouse {
        let warehouse = DuckWarehouse::open_in_memory().expect("open warehouse");
        warehouse
            .execute_batch(
                "ATTACH ':memory:' AS \"ANALYTICS\";
                 CREATE SCHEMA \"ANALYTICS\".\"SALES\";
                 CREATE TABLE \"ANALYTICS\".\"SALES\".\"EMP_SALARY\" (
                     NAME VARCHAR NOT NULL,
                     SALARY INTEGER,
                     HIRED DATE
                 );
                 INSERT INTO \"ANALYTICS\".\"SALES\".\"EMP_SALARY\" VALUES
                     ('ada', 100, DATE '2020-01-02');",
            )
            .await
            .expect("seed");
        warehouse
    }

    fn path() -> CatalogPath {
        CatalogPath::new("ANALYTICS", "SALES", "EMP_SALARY")
    }

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> TabularFile {
        TabularFile::new(
            columns.iter().map(ToString::to_string).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.map(ToString::to_string)).collect())
                .collect(),
        )
        .expect("valid table")
    }

    #[tokio::test]
    async fn query_returns_named_text_records() {
        let warehouse = seeded().await;
        let records = warehouse
            .query(
                "SELECT NAME, SALARY, HIRED FROM \"ANALYTICS\".\"SALES\".\"EMP_SALARY\" WHERE NAME = ?",
                &["ada".to_string()],
            )
            .await
            .expect("query");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].columns(), ["NAME", "SALARY", "HIRED"]);
        assert_eq!(records[0].get("name"), Some("ada"));
        assert_eq!(records[0].get("SALARY"), Some("100"));
        assert_eq!(records[0].get("HIRED"), Some("2020-01-02"));
    }

    #[tokio::test]
    async fn append_casts_text_and_counts_rows() {
        let warehouse = seeded().await;
        let data = table(
            &["NAME", "SALARY"],
            &[&[Some("bob"), Some("200")], &[Some("cy"), None]],
        );

        let inserted = warehouse.append_rows(&path(), &data).await.expect("append");
        assert_eq!(inserted, 2);
        assert_eq!(warehouse.count_rows(&path()).await.expect("count"), 3);

        let nulls = warehouse
            .query(
                "SELECT count(*) AS n FROM \"ANALYTICS\".\"SALES\".\"EMP_SALARY\" WHERE SALARY IS NULL",
                &[],
            )
            .await
            .expect("query");
        assert_eq!(nulls[0].get("n"), Some("1"));
    }

    #[tokio::test]
    async fn failing_row_rolls_back_whole_append() {
        let warehouse = seeded().await;
        let data = table(
            &["NAME", "SALARY"],
            &[&[Some("bob"), Some("200")], &[Some("cy"), Some("not-a-number")]],
        );

        let err = warehouse.append_rows(&path(), &data).await.unwrap_err();
        assert!(matches!(err, WarehouseError::DuckDb(_)));
        assert_eq!(warehouse.count_rows(&path()).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn unknown_column_is_rejected_verbatim() {
        let warehouse = seeded().await;
        let data = table(&["NAME", "BONUS"], &[&[Some("bob"), Some("5")]]);

        let err = warehouse.append_rows(&path(), &data).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("BONUS"), "unexpected error: {message}");
        assert_eq!(warehouse.count_rows(&path()).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn open_attaches_configured_databases() {
        let tmpdir = tempfile::tempdir().expect("tempdir");
        let file = tmpdir.path().join("finance.duckdb");
        let config = DuckDbConfig {
            path: ":memory:".into(),
            attach: vec![AttachConfig {
                alias: "FINANCE".into(),
                path: file.to_string_lossy().into_owned(),
                read_only: false,
            }],
        };

        let warehouse = DuckWarehouse::open(&config).expect("open");
        let names: Vec<String> = warehouse
            .query(
                "SELECT database_name FROM duckdb_databases() WHERE NOT internal ORDER BY database_name",
                &[],
            )
            .await
            .expect("list")
            .iter()
            .filter_map(|r| r.value(0).map(ToString::to_string))
            .collect();
        assert!(names.contains(&"FINANCE".to_string()), "got {names:?}");
    }

    #[tokio::test]
    async fn infinite_dates_render_as_text() {
        let warehouse = DuckWarehouse::open_in_memory().expect("open");
        let records = warehouse
            .query(
                "SELECT 'infinity'::DATE AS hi, '-infinity'::DATE AS lo, DATE '2020-01-02' AS ok",
                &[],
            )
            .await
            .expect("query");
        assert_eq!(records[0].get("hi"), Some("infinity"));
        assert_eq!(records[0].get("lo"), Some("-infinity"));
        assert_eq!(records[0].get("ok"), Some("2020-01-02"));
    }

    #[test]
    fn out_of_range_dates_fall_back_to_day_count() {
        let near_max = i32::MAX - 1;
        assert_eq!(
            value_to_text(Value::Date32(near_max)),
            Some(near_max.to_string())
        );
        assert_eq!(
            value_to_text(Value::Timestamp(TimeUnit::Microsecond, i64::MAX)),
            Some(String::from("infinity"))
        );
    }

    #[test]
    fn attach_statement_escapes_and_flags_read_only() {
        let attach = AttachConfig {
            alias: "ARCHIVE".into(),
            path: "/data/o'neil.duckdb".into(),
            read_only: true,
        };
        assert_eq!(
            attach_statement(&attach),
            "ATTACH '/data/o''neil.duckdb' AS \"ARCHIVE\" (READ_ONLY)"
        );
    }
}
