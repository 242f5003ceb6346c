pub mod catalog;
pub mod dispatch;
pub mod query;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support {
    use hopper_config::HopperConfig;
    use hopper_warehouse::WarehouseClient;

    use crate::context::AppContext;

    /// In-memory `DuckDB` context with one attached database holding
    /// `ANALYTICS.SALES.EMP_SALARY` (three rows).
    pub async fn seeded_context() -> AppContext {
        let ctx = AppContext::init(HopperConfig::default()).expect("context");
        let WarehouseClient::DuckDb(duck) = &ctx.warehouse else {
            panic!("default config should select duckdb");
        };
        duck.execute_batch(
            "ATTACH ':memory:' AS \"ANALYTICS\";
             CREATE SCHEMA \"ANALYTICS\".\"SALES\";
             CREATE TABLE \"ANALYTICS\".\"SALES\".\"EMP_SALARY\" (NAME VARCHAR, SALARY INTEGER);
             CREATE TABLE \"ANALYTICS\".\"SALES\".\"ACCOUNTS\" (ID INTEGER);
             INSERT INTO \"ANALYTICS\".\"SALES\".\"EMP_SALARY\" VALUES ('ada', 120), ('bob', 90), ('cy', 150);",
        )
        .await
        .expect("seed");
        ctx
    }
}
