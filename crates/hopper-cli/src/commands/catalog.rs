use anyhow::Context;
use hopper_ingest::{CatalogLister, UploadController};
use serde::Serialize;

use crate::cli::root_commands::{SchemasArgs, TablesArgs};
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct DatabaseRow {
    database: String,
}

#[derive(Debug, Serialize)]
struct SchemaRow {
    database: String,
    schema: String,
}

#[derive(Debug, Serialize)]
struct TableRow {
    database: String,
    schema: String,
    table: String,
}

#[derive(Debug, Serialize)]
pub struct DatabaseNode {
    pub database: String,
    pub schemas: Vec<SchemaNode>,
}

#[derive(Debug, Serialize)]
pub struct SchemaNode {
    pub schema: String,
    pub tables: Vec<String>,
}

/// Handle `hopper databases`.
pub async fn handle_databases(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut controller = UploadController::new(&ctx.warehouse, &ctx.config.catalog);
    let databases = controller
        .databases()
        .await
        .context("failed to list databases")?;

    let rows = databases
        .into_iter()
        .map(|database| DatabaseRow { database })
        .collect::<Vec<_>>();
    output(&rows, flags.format)
}

/// Handle `hopper schemas <database>`.
pub async fn handle_schemas(
    args: &SchemasArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut controller = UploadController::new(&ctx.warehouse, &ctx.config.catalog);
    let schemas = controller.select_database(&args.database).await?;

    let rows = schemas
        .into_iter()
        .map(|schema| SchemaRow {
            database: args.database.clone(),
            schema,
        })
        .collect::<Vec<_>>();
    output(&rows, flags.format)
}

/// Handle `hopper tables <database> <schema>`.
pub async fn handle_tables(
    args: &TablesArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut controller = UploadController::new(&ctx.warehouse, &ctx.config.catalog);
    controller.select_database(&args.database).await?;
    let tables = controller.select_schema(&args.schema).await?;

    let rows = tables
        .into_iter()
        .map(|table| TableRow {
            database: args.database.clone(),
            schema: args.schema.clone(),
            table,
        })
        .collect::<Vec<_>>();
    output(&rows, flags.format)
}

/// Handle `hopper browse`.
pub async fn handle_browse(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let tree = catalog_tree(ctx).await?;
    match flags.format {
        OutputFormat::Table => {
            println!("{}", render_tree(&tree));
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Raw => output(&tree, flags.format),
    }
}

pub async fn catalog_tree(ctx: &AppContext) -> anyhow::Result<Vec<DatabaseNode>> {
    let progress = Progress::spinner("Listing databases");
    let mut lister = CatalogLister::new(&ctx.warehouse, ctx.config.catalog.cache_ttl());

    let mut tree = Vec::new();
    for database in lister.list_databases().await? {
        if ctx.config.catalog.is_excluded(&database) {
            continue;
        }
        progress.set_message(&format!("Listing {database}"));
        let mut schemas = Vec::new();
        for schema in lister.list_schemas(&database).await? {
            let tables = lister
                .list_tables(&database, &schema)
                .await
                .with_context(|| format!("failed to list tables of {database}.{schema}"))?;
            schemas.push(SchemaNode { schema, tables });
        }
        tree.push(DatabaseNode { database, schemas });
    }
    progress.finish_clear();
    Ok(tree)
}

fn render_tree(tree: &[DatabaseNode]) -> String {
    if tree.is_empty() {
        return String::from("(no databases)");
    }
    let mut lines = Vec::new();
    for node in tree {
        lines.push(node.database.clone());
        if node.schemas.is_empty() {
            lines.push(String::from("  (no schemas with tables)"));
        }
        for schema in &node.schemas {
            lines.push(format!("  {}", schema.schema));
            for table in &schema.tables {
                lines.push(format!("    {table}"));
            }
        }
    }
    lines.join("\n")
}
