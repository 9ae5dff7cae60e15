//! Filesystem module.
//!
//! Provides:
//! - Project directory layout
//! - Local file name validation

pub mod naming;
pub mod paths;

pub use naming::{partial_path, sanitize_filename, sanitize_path_component, PARTIAL_SUFFIX};
pub use paths::{ensure_dir, ProjectPaths};
