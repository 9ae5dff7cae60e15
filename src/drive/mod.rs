//! Google Drive access.
//!
//! This module provides:
//! - Folder lookup by name
//! - Paged file listing
//! - Streamed file downloads

pub mod client;
pub mod types;

pub use client::{Downloaded, DriveApi, DRIVE_API_BASE};
pub use types::{DriveFile, FileList};
