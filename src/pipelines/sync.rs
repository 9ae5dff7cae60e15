//! Drive folder sync.

use crate::config::{validate_sync_config, SyncConfig};
use crate::error::{Error, Result};
use crate::output::{print_config_summary, print_sync_stats};
use crate::pipelines::PipelineContext;
use crate::sync::{run_sync, SyncState};

#[derive(Debug, Clone, Default)]
pub struct SyncDriveOptions {
    pub config: Option<std::path::PathBuf>,
    /// Re-download files that already exist locally.
    pub overwrite: bool,
    /// Plan only, download nothing.
    pub dry_run: bool,
}

/// Download new files from the configured Drive folder.
///
/// Fails with [`Error::SyncIncomplete`] when any single download failed.
pub async fn sync_drive(ctx: &PipelineContext, options: &SyncDriveOptions) -> Result<SyncState> {
    let (config_path, mut config): (_, SyncConfig) =
        ctx.load_config(options.config.as_deref(), ctx.paths.sync_config())?;
    ctx.log.apply_config_level(&config.sync.log_level)?;
    validate_sync_config(&config)?;

    config.local.target_dir = ctx.paths.resolve(&config.local.target_dir);
    config.sync.overwrite |= options.overwrite;

    print_config_summary(&[
        ("Pipeline", "Drive sync".to_string()),
        ("Config", config_path.display().to_string()),
        ("Folder", config.google_drive.folder_name.clone()),
        ("Extensions", config.google_drive.file_extensions.join(", ")),
        ("Target", config.local.target_dir.display().to_string()),
        ("Overwrite", config.sync.overwrite.to_string()),
    ]);

    let token = ctx.token_source(&config.auth).await?;
    let drive = ctx.drive(token);

    let state = run_sync(&drive, &config, options.dry_run).await?;
    print_sync_stats(&state, options.dry_run);

    if !state.is_complete() {
        return Err(Error::SyncIncomplete(state.failed));
    }
    Ok(state)
}
