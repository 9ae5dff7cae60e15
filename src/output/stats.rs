//! Statistics reporting.

use console::style;

use crate::ee::{Operation, TaskState};
use crate::sync::SyncState;

/// Print the counters of a sync run.
pub fn print_sync_stats(state: &SyncState, dry_run: bool) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Sync Statistics:").bold());
    if dry_run {
        println!("  Would download: {}", state.planned);
    } else {
        println!("  Downloaded: {} ({} bytes)", state.downloaded, state.bytes);
    }
    println!("  Skipped:    {} (already present)", state.skipped);
    println!("  Ignored:    {} (extension or document type)", state.ignored);
    if state.rejected > 0 {
        println!("  Rejected:   {}", style(state.rejected).yellow());
    }
    if state.failed > 0 {
        println!("  Failed:     {}", style(state.failed).red());
    }
    println!("{}", style("═".repeat(50)).dim());
}

/// Print one line per Earth Engine operation.
pub fn print_operations(operations: &[Operation]) {
    if operations.is_empty() {
        println!("No operations found");
        return;
    }

    for op in operations {
        let state = op.state();
        let label = format!("{:<10}", state.to_string());
        let label = match state {
            TaskState::Succeeded => style(label).green(),
            TaskState::Failed | TaskState::Cancelled => style(label).red(),
            TaskState::Running | TaskState::Pending => style(label).cyan(),
            _ => style(label).dim(),
        };
        let id = op.name.rsplit('/').next().unwrap_or(&op.name);
        println!(
            "{} {:<28} {:<24} {}",
            label,
            id,
            op.metadata.create_time.as_deref().unwrap_or("-"),
            op.metadata.description.as_deref().unwrap_or("")
        );
        if let Some(error) = &op.error {
            println!("           {}", style(&error.message).red());
        }
    }
}

/// Print where a finished export landed.
pub fn print_export_result(operation: &Operation) {
    println!(
        "Export {}: {}",
        style(operation.state()).green(),
        operation.metadata.description.as_deref().unwrap_or(&operation.name)
    );
    for uri in &operation.metadata.destination_uris {
        println!("  {}", uri);
    }
}
