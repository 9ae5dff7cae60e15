//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Statistics reporting
//! - Log subscriber setup

pub mod console;
pub mod logging;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_success, print_warning,
};
pub use logging::{init_logging, LogControl};
pub use progress::{create_download_bar, create_item_bar, create_spinner};
pub use stats::{print_export_result, print_operations, print_sync_stats};
