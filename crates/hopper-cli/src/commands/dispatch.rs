use std::process::ExitCode;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Databases => commands::catalog::handle_databases(ctx, flags).await?,
        Commands::Schemas(args) => commands::catalog::handle_schemas(&args, ctx, flags).await?,
        Commands::Tables(args) => commands::catalog::handle_tables(&args, ctx, flags).await?,
        Commands::Browse => commands::catalog::handle_browse(ctx, flags).await?,
        Commands::Upload(args) => return commands::upload::handle(&args, ctx, flags).await,
        Commands::Query(args) => commands::query::handle(&args, ctx, flags).await?,
    }
    Ok(ExitCode::SUCCESS)
}
