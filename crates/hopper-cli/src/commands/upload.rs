use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use hopper_config::parse_delimiter;
use hopper_core::{FileUpload, UploadResult};
use hopper_ingest::{IngestError, ParseOptions, UploadController};
use hopper_warehouse::WarehouseClient;
use serde::Serialize;

use crate::cli::root_commands::UploadArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct UploadReport<'a> {
    destination: String,
    #[serde(flatten)]
    result: &'a UploadResult,
    summary: String,
}

/// Handle `hopper upload`. Prints one message; exits 1 unless the upload
/// succeeded or is still awaiting a file.
pub async fn handle(
    args: &UploadArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    let result = upload(args, ctx).await?;

    let report = UploadReport {
        destination: format!("{}.{}.{}", args.database, args.schema, args.table),
        result: &result,
        summary: result.message(),
    };
    match flags.format {
        OutputFormat::Table => println!("{}", report.summary),
        OutputFormat::Json | OutputFormat::Raw => output(&report, flags.format)?,
    }

    Ok(if result.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Run the selection and upload sequence, folding flow errors into the result.
async fn upload(args: &UploadArgs, ctx: &AppContext) -> anyhow::Result<UploadResult> {
    let delimiter = match &args.delimiter {
        Some(value) => parse_delimiter(value)?,
        None => ctx.config.upload.delimiter_byte()?,
    };
    let file = args.file.as_deref().map(read_upload).transpose()?;

    let mut controller = UploadController::new(&ctx.warehouse, &ctx.config.catalog)
        .with_parse_options(ParseOptions { delimiter })
        .with_verify_row_count(ctx.config.upload.verify_row_count);

    match select_and_submit(&mut controller, args, file).await {
        Ok(result) => Ok(result),
        Err(error) => {
            tracing::warn!(%error, "upload rejected");
            Ok(UploadResult::from(&error))
        }
    }
}

async fn select_and_submit(
    controller: &mut UploadController<'_, WarehouseClient>,
    args: &UploadArgs,
    file: Option<FileUpload>,
) -> Result<UploadResult, IngestError> {
    controller.select_database(&args.database).await?;
    controller.select_schema(&args.schema).await?;
    controller.select_table(&args.table).await?;
    let label = controller.upload_label()?;

    let Some(file) = file else {
        tracing::info!("{label}");
        return controller.submit(None).await;
    };
    let progress = Progress::spinner(&format!("Ingesting {}", file.name));
    let result = controller.submit(Some(file)).await;
    progress.finish_clear();
    result
}

fn read_upload(path: &Path) -> anyhow::Result<FileUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    Ok(FileUpload::new(name, bytes))
}
