//! Incremental Drive to local sync.
//!
//! A run first plans (what to download, skip, reject or ignore) and then
//! downloads the planned files one at a time.

pub mod plan;
pub mod run;
pub mod state;

pub use plan::{plan_sync, PlannedDownload, SkipReason, SyncPlan};
pub use run::run_sync;
pub use state::SyncState;
