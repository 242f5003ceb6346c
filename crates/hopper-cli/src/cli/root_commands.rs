use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List databases visible to the configured warehouse.
    Databases,
    /// List schemas of a database that hold at least one table.
    Schemas(SchemasArgs),
    /// List base tables of a schema.
    Tables(TablesArgs),
    /// Show the whole catalog as databases, schemas and tables.
    Browse,
    /// Append a CSV file to a table.
    Upload(UploadArgs),
    /// Run the configured read query and print its rows.
    Query(QueryArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SchemasArgs {
    /// Database to list.
    pub database: String,
}

#[derive(Clone, Debug, Args)]
pub struct TablesArgs {
    pub database: String,
    pub schema: String,
}

#[derive(Clone, Debug, Args)]
pub struct UploadArgs {
    /// Destination database.
    #[arg(long)]
    pub database: String,

    /// Destination schema.
    #[arg(long)]
    pub schema: String,

    /// Destination table.
    #[arg(long)]
    pub table: String,

    /// CSV file to append (`.gz` is decompressed). Without it nothing is written.
    pub file: Option<PathBuf>,

    /// Field delimiter, overriding `upload.delimiter` (`\t` for tab).
    #[arg(long)]
    pub delimiter: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct QueryArgs {
    /// Statement to run instead of `query.statement`.
    #[arg(long)]
    pub sql: Option<String>,
}
