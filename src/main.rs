//! cool-routes - CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use cool_routes::{
    cli::{Args, Command},
    error::{exit_codes, Result},
    output::{init_logging, print_banner, print_error},
    pipelines::{
        buildings::BuildingsOptions, export_buildings, export_lst, export_ndvi, list_tasks,
        sync::SyncDriveOptions, sync_drive, PipelineContext,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log = init_logging(args.debug);

    print_banner();

    let ctx = PipelineContext::new(&args.root, args.access_token, log)?;

    match args.command {
        Command::ExportBuildings {
            region,
            export,
            local_output,
        } => {
            let options = BuildingsOptions {
                export: export.into(),
                local_output,
            };
            export_buildings(&ctx, &region, &options).await?;
        }
        Command::ExportNdvi { region, export } => {
            export_ndvi(&ctx, region.as_deref(), &export.into()).await?;
        }
        Command::ExportLst { region, export } => {
            export_lst(&ctx, region.as_deref(), &export.into()).await?;
        }
        Command::Sync {
            config,
            overwrite,
            dry_run,
        } => {
            let options = SyncDriveOptions {
                config,
                overwrite,
                dry_run,
            };
            sync_drive(&ctx, &options).await?;
        }
        Command::Tasks { project, limit } => {
            list_tasks(&ctx, &project, limit).await?;
        }
    }

    Ok(())
}
