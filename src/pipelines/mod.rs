//! Pipeline orchestration, one function per CLI subcommand.

pub mod buildings;
pub mod context;
pub mod lst;
pub mod ndvi;
pub mod sync;
pub mod tasks;

use std::path::PathBuf;
use std::time::Duration;

pub use buildings::export_buildings;
pub use context::{Endpoints, PipelineContext};
pub use lst::export_lst;
pub use ndvi::export_ndvi;
pub use sync::sync_drive;
pub use tasks::list_tasks;

use crate::ee::{EarthEngineApi, Operation};
use crate::error::Result;
use crate::output::{print_export_result, print_success};

/// Options shared by the export subcommands.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Config file overriding the default under `config/gee/`.
    pub config: Option<PathBuf>,
    /// Poll the started task until it finishes.
    pub wait: bool,
}

/// How an export run ended.
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    /// Task started, not waited on.
    Submitted(Operation),
    /// Task started and finished successfully.
    Completed(Operation),
    /// Result computed and written locally.
    Written(PathBuf),
}

/// Report a started task and optionally wait for it.
pub(crate) async fn finish_export(
    api: &EarthEngineApi,
    operation: Operation,
    wait: bool,
    poll_interval_seconds: u64,
) -> Result<ExportOutcome> {
    print_success(&format!("Export task started: {}", operation.name));

    if !wait {
        return Ok(ExportOutcome::Submitted(operation));
    }

    let interval = Duration::from_secs(poll_interval_seconds.max(1));
    let finished = api.wait_for_operation(&operation.name, interval).await?;
    print_export_result(&finished);
    Ok(ExportOutcome::Completed(finished))
}
