//! Execute a sync plan against Drive.

use crate::config::SyncConfig;
use crate::drive::DriveApi;
use crate::error::Result;
use crate::fs::ensure_dir;
use crate::output::{create_item_bar, print_info, print_warning};
use crate::sync::plan::{plan_sync, PlannedDownload, SkipReason, SyncPlan};
use crate::sync::state::SyncState;

/// Sync the configured Drive folder into `config.local.target_dir`.
///
/// Individual download failures are logged and counted; the run goes on
/// with the remaining files.
pub async fn run_sync(drive: &DriveApi, config: &SyncConfig, dry_run: bool) -> Result<SyncState> {
    let folder_name = &config.google_drive.folder_name;
    let target_dir = &config.local.target_dir;

    let folder_id = drive.find_folder_id(folder_name).await?;
    tracing::info!("Drive folder '{}' has id {}", folder_name, folder_id);

    let remote = drive.list_files(&folder_id).await?;
    tracing::info!("{} files in Drive folder '{}'", remote.len(), folder_name);

    let plan = plan_sync(
        remote,
        &config.google_drive.file_extensions,
        target_dir,
        config.sync.overwrite,
    );
    log_plan(&plan);

    let mut state = SyncState {
        skipped: plan.skipped.len() as u64,
        ignored: plan.ignored.len() as u64,
        rejected: plan.rejected.len() as u64,
        ..Default::default()
    };

    if dry_run {
        for item in &plan.download {
            print_info(&format!("Would download {}", item.file.name));
        }
        state.planned = plan.download.len() as u64;
        return Ok(state);
    }

    if plan.download.is_empty() {
        tracing::info!("Nothing to download");
        return Ok(state);
    }

    ensure_dir(target_dir)?;

    let bar = create_item_bar(plan.download.len() as u64, "Syncing");
    for item in &plan.download {
        match download_one(drive, item).await {
            Ok(bytes) => {
                tracing::info!("Downloaded: {}", item.dest.display());
                state.record_download(bytes);
            }
            Err(e) => {
                bar.suspend(|| print_warning(&format!("Failed {}: {}", item.file.name, e)));
                state.record_failure();
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(state)
}

/// Download one file. Checksum mismatches leave any existing local copy alone.
async fn download_one(drive: &DriveApi, item: &PlannedDownload) -> Result<u64> {
    let downloaded = drive.download_file(&item.file, &item.dest).await?;
    Ok(downloaded.bytes)
}

fn log_plan(plan: &SyncPlan) {
    for (file, reason) in &plan.skipped {
        match reason {
            SkipReason::Exists => tracing::debug!("Skipping existing file: {}", file.name),
            SkipReason::Duplicate => {
                tracing::warn!("Skipping duplicate remote name: {} ({})", file.name, file.id)
            }
        }
    }
    for (file, reason) in &plan.rejected {
        tracing::warn!("Rejected {}: {}", file.name, reason);
    }
    for file in &plan.ignored {
        tracing::debug!("Ignoring {} ({})", file.name, file.mime_type);
    }
    tracing::info!(
        "{} to download ({} bytes), {} skipped, {} ignored, {} rejected",
        plan.download.len(),
        plan.download_bytes(),
        plan.skipped.len(),
        plan.ignored.len(),
        plan.rejected.len()
    );
}
