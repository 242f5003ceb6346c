use anyhow::Context;
use hopper_warehouse::{Record, Warehouse};

use crate::cli::root_commands::QueryArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::{output, table, table_options};
use crate::progress::Progress;

/// Handle `hopper query`.
pub async fn handle(args: &QueryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let sql = args.sql.as_deref().unwrap_or(&ctx.config.query.statement);

    let progress = Progress::spinner("Running query");
    let records = ctx
        .warehouse
        .query(sql, &[])
        .await
        .with_context(|| format!("query failed: {sql}"))?;
    progress.finish_clear();

    match flags.format {
        OutputFormat::Table => {
            println!("{}", render_records(&records));
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Raw => output(&records, flags.format),
    }
}

/// Table of `records` in result column order.
fn render_records(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::from("(no rows)");
    };
    let headers = first.columns().iter().map(String::as_str).collect::<Vec<_>>();
    let rows = records
        .iter()
        .map(|record| {
            record
                .values()
                .iter()
                .map(|value| value.clone().unwrap_or_else(|| String::from("NULL")))
                .collect()
        })
        .collect::<Vec<_>>();
    table::render_table(&headers, &rows, table_options())
}
